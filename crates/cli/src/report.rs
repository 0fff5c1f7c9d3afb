//! `pairmatch parse`: run the Conclusion parser over a saved report.

use std::io::{self, Read};
use std::path::PathBuf;

use pairmatch_core::parse_conclusion;

use crate::exit_codes::EXIT_INPUT;
use crate::CliError;

pub fn cmd_parse(file: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let text = match &file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::new(EXIT_INPUT, format!("cannot read {}: {}", path.display(), e)))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::new(EXIT_INPUT, format!("cannot read stdin: {}", e)))?;
            buf
        }
    };

    let conclusion = parse_conclusion(&text);
    let verdict = conclusion.verdict();
    let final_result = conclusion
        .final_same
        .map(|same| if same { "Same" } else { "Not same" });

    if json {
        let out = serde_json::json!({
            "brand": conclusion.brand.map(|s| s.as_str()),
            "product": conclusion.product.map(|s| s.as_str()),
            "final_result": final_result,
            "complete": conclusion.is_complete(),
            "verdict": verdict.as_str(),
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::general(format!("JSON serialization failed: {}", e)))?;
        println!("{text}");
    } else {
        let show = |v: Option<&str>| v.unwrap_or("(not found)").to_string();
        println!("brand:           {}", show(conclusion.brand.map(|s| s.as_str())));
        println!("product:         {}", show(conclusion.product.map(|s| s.as_str())));
        println!("final result:    {}", show(final_result));
        println!("verdict:         {}", verdict);
    }

    if !conclusion.is_complete() {
        log::warn!("Conclusion block incomplete; verdict falls back to Not Match");
    }
    Ok(())
}
