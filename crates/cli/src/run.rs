//! `pairmatch run`: load, judge pending rows, save.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use pairmatch_ai::{AiJudge, ChatClient};
use pairmatch_config::{AiConfigStatus, ResolvedAiConfig, Settings, Strategy};
use pairmatch_core::{run_batch, BatchOptions, BatchSummary, ExactJudge, Judge};
use pairmatch_io::FileFormat;
use serde::Serialize;

use crate::exit_codes::{EXIT_AI_MISSING_KEY, EXIT_INPUT, EXIT_OUTPUT};
use crate::CliError;

pub struct RunArgs {
    pub file: PathBuf,
    pub strategy: Option<Strategy>,
    pub sheet: Option<String>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub limit: Option<usize>,
    pub dry_run: bool,
    pub json: bool,
}

/// Machine-readable result of a run (`--json`).
#[derive(Serialize)]
struct RunReport<'a> {
    input: String,
    output: String,
    sheet: &'a str,
    strategy: &'static str,
    dry_run: bool,
    saved: bool,
    elapsed_ms: u128,
    summary: &'a BatchSummary,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let (mut settings, source) = Settings::load(args.config.as_deref()).map_err(CliError::config)?;
    log::debug!("settings: {}", source);

    if let Some(strategy) = args.strategy {
        settings.strategy = strategy;
    }
    if let Some(delay_ms) = args.delay_ms {
        settings.delay_ms = delay_ms;
    }
    let layout = settings.columns.layout().map_err(CliError::config)?;

    // Credential check comes before the input is touched
    let mut judge = build_judge(&settings)?;

    let input_format = FileFormat::from_path(&args.file).map_err(CliError::usage)?;
    let output_path = args.output.clone().unwrap_or_else(|| args.file.clone());
    check_output(&output_path, args.output.is_some(), input_format)?;

    if !args.file.exists() {
        return Err(CliError::new(EXIT_INPUT, format!("{}: no such file", args.file.display())));
    }
    let mut workbook = pairmatch_io::load(&args.file, args.sheet.as_deref())
        .map_err(|e| CliError::new(EXIT_INPUT, e))?;

    log::info!(
        "{}: sheet '{}', {} rows, strategy {}, columns {}",
        args.file.display(),
        workbook.active().name,
        workbook.active().height(),
        judge.name(),
        layout.describe()
    );

    let options = BatchOptions {
        delay: Duration::from_millis(settings.delay_ms),
        limit: args.limit,
    };

    let started = Instant::now();
    let summary = run_batch(workbook.active_mut(), &layout, judge.as_mut(), &options);
    let elapsed = started.elapsed();

    let must_save = summary.modified() || args.output.is_some();
    let saved = if args.dry_run {
        log::info!("dry run: {} not written", output_path.display());
        false
    } else if must_save {
        pairmatch_io::save(&workbook, &output_path)
            .map_err(|e| CliError::new(EXIT_OUTPUT, e))?;
        log::info!("wrote {}", output_path.display());
        true
    } else {
        log::info!("no rows changed; {} left as is", output_path.display());
        false
    };

    if args.json {
        let report = RunReport {
            input: args.file.display().to_string(),
            output: output_path.display().to_string(),
            sheet: &workbook.active().name,
            strategy: settings.strategy.name(),
            dry_run: args.dry_run,
            saved,
            elapsed_ms: elapsed.as_millis(),
            summary: &summary,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization failed: {}", e)))?;
        println!("{json}");
    } else {
        print_summary(&summary, elapsed);
    }

    Ok(())
}

fn build_judge(settings: &Settings) -> Result<Box<dyn Judge>, CliError> {
    match settings.strategy {
        Strategy::Exact => Ok(Box::new(ExactJudge::default())),
        Strategy::Ai => {
            let resolved = ResolvedAiConfig::from_settings(&settings.ai);
            if resolved.status == AiConfigStatus::MissingKey {
                let reason = resolved
                    .blocking_reason
                    .unwrap_or_else(|| "no API key found".to_string());
                return Err(CliError::new(EXIT_AI_MISSING_KEY, format!("AI strategy unavailable: {reason}"))
                    .with_hint(format!("export {}=<key>, or use --strategy exact", resolved.key_env)));
            }
            log::debug!("ai: model {} at {}", resolved.model, resolved.endpoint);
            let client = ChatClient::new(&resolved).map_err(|e| CliError::general(e.to_string()))?;
            Ok(Box::new(AiJudge::new(client)))
        }
    }
}

/// Reject unwritable output formats before any row is judged.
fn check_output(path: &Path, explicit: bool, input_format: FileFormat) -> Result<(), CliError> {
    let format = FileFormat::from_path(path).map_err(CliError::usage)?;
    if format.is_writable() {
        return Ok(());
    }
    let message = format!("{}: this format can be read but not written", path.display());
    let hint = if explicit || input_format != FileFormat::LegacySpreadsheet {
        "choose an .xlsx, .csv or .tsv output path".to_string()
    } else {
        format!(
            "pass --output {}",
            path.with_extension("xlsx").display()
        )
    };
    Err(CliError::new(EXIT_OUTPUT, message).with_hint(hint))
}

fn print_summary(summary: &BatchSummary, elapsed: Duration) {
    eprintln!(
        "{} rows scanned in {:.1}s ({} strategy)",
        summary.rows_scanned,
        elapsed.as_secs_f64(),
        summary.judge
    );
    eprintln!("  match:          {}", summary.matched);
    eprintln!("  not match:      {}", summary.not_matched);
    eprintln!("  error:          {}", summary.errors);
    eprintln!("  already done:   {}", summary.already_done);
    eprintln!("  no instruction: {}", summary.no_instruction);
    if summary.limited {
        eprintln!("  stopped at --limit; rerun to continue");
    }
    if summary.errors > 0 {
        let rows: Vec<String> = summary
            .outcomes
            .iter()
            .filter(|o| matches!(o.written(), Some(pairmatch_core::Verdict::Error)))
            .map(|o| o.row().to_string())
            .collect();
        eprintln!("  error rows ({}) are retried on the next run", rows.join(", "));
    }
}
