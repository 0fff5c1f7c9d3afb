//! `pairmatch doctor`: effective settings and credential status. Never prints the key.

use std::path::PathBuf;

use pairmatch_config::{AiDiagnostics, ResolvedAiConfig, Settings, Strategy};

use crate::exit_codes::EXIT_AI_MISSING_KEY;
use crate::CliError;

pub fn cmd_doctor(config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let (settings, source) = Settings::load(config.as_deref()).map_err(CliError::config)?;
    let layout = settings.columns.layout().map_err(CliError::config)?;
    let diag = AiDiagnostics::from_resolved(&ResolvedAiConfig::from_settings(&settings.ai));

    if json {
        let out = serde_json::json!({
            "settings": source.to_string(),
            "strategy": settings.strategy.name(),
            "delay_ms": settings.delay_ms,
            "columns": {
                "product_a": settings.columns.product_a,
                "product_b": settings.columns.product_b,
                "publisher_a": settings.columns.publisher_a,
                "publisher_b": settings.columns.publisher_b,
                "status": settings.columns.status,
                "instruction": settings.columns.instruction,
                "report": layout.report.map(|_| settings.columns.report.clone()),
            },
            "ai": diag,
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::general(format!("JSON serialization failed: {}", e)))?;
        println!("{text}");
    } else {
        println!("settings:        {}", source);
        println!("strategy:        {}", settings.strategy.name());
        println!("delay:           {} ms", settings.delay_ms);
        println!("columns:         {}", layout.describe());
        if layout.report.is_none() {
            println!("audit column:    disabled");
        }
        println!();
        print!("{diag}");
    }

    // Only a blocker when the AI strategy is actually selected
    if settings.strategy == Strategy::Ai && !diag.status.is_ready() {
        let reason = diag
            .blocking_reason
            .unwrap_or_else(|| "no API key found".to_string());
        return Err(CliError::new(EXIT_AI_MISSING_KEY, format!("AI misconfigured: {}", reason)));
    }
    Ok(())
}
