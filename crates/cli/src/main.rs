// pairmatch CLI - batch Match / Not Match verdicts for product/publisher pairs

mod doctor;
mod exit_codes;
mod report;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use pairmatch_config::{ConfigError, Settings, Strategy};

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "pairmatch")]
#[command(about = "Decide whether product/publisher pairs in a spreadsheet are the same product")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge every pending row and write verdicts back
    #[command(after_help = "\
Examples:
  pairmatch run batch5.xlsx
  pairmatch run batch5.xlsx --strategy ai --sheet 'Batch 5'
  pairmatch run legacy.xls --output legacy-checked.xlsx
  pairmatch run pairs.csv --dry-run --json
  pairmatch run batch5.xlsx --strategy ai --limit 20 --delay-ms 1000")]
    Run {
        /// Spreadsheet to process (.xlsx, .xlsm, .xls, .xlsb, .ods, .csv, .tsv)
        file: PathBuf,

        /// Verdict strategy (default from settings: exact)
        #[arg(long, short = 's')]
        strategy: Option<StrategyArg>,

        /// Sheet to process (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Write results here instead of overwriting FILE
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Settings file
        #[arg(long, env = "PAIRMATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Pause between judged rows, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Stop after this many judged rows
        #[arg(long)]
        limit: Option<usize>,

        /// Judge rows but do not save
        #[arg(long)]
        dry_run: bool,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show effective settings, column layout and credential status
    #[command(after_help = "\
Examples:
  pairmatch doctor
  pairmatch doctor --json
  pairmatch doctor --config ./settings.toml")]
    Doctor {
        /// Settings file
        #[arg(long, env = "PAIRMATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract Brand / Product / Final result from a saved AI report
    #[command(after_help = "\
Examples:
  pairmatch parse report.txt
  pbpaste | pairmatch parse
  pairmatch parse report.txt --json")]
    Parse {
        /// Report file (omit to read from stdin)
        file: Option<PathBuf>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a commented default settings file
    InitConfig {
        /// Destination (default: the user settings path)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Normalized string equality, no network
    Exact,
    /// AI-generated comparison report
    Ai,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Exact => Strategy::Exact,
            StrategyArg::Ai => Strategy::Ai,
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    // RUST_LOG wins over the flags
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run {
            file,
            strategy,
            sheet,
            output,
            config,
            delay_ms,
            limit,
            dry_run,
            json,
        } => run::cmd_run(run::RunArgs {
            file,
            strategy: strategy.map(Strategy::from),
            sheet,
            output,
            config,
            delay_ms,
            limit,
            dry_run,
            json,
        }),
        Commands::Doctor { config, json } => doctor::cmd_doctor(config, json),
        Commands::Parse { file, json } => report::cmd_parse(file, json),
        Commands::InitConfig { path, force } => cmd_init_config(path, force),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Map a settings error to its exit code.
    pub fn config(err: ConfigError) -> Self {
        match err {
            ConfigError::Exists(_) => Self::usage(err.to_string())
                .with_hint("pass --force to overwrite"),
            ConfigError::Write { .. } => Self::new(EXIT_OUTPUT, err.to_string()),
            ConfigError::Read { .. } | ConfigError::Parse(_) | ConfigError::Invalid(_) => {
                Self::new(EXIT_CONFIG, err.to_string())
                    .with_hint("run `pairmatch init-config --path <file>` for a commented template")
            }
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// init-config
// ============================================================================

fn cmd_init_config(path: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    let path = path.unwrap_or_else(Settings::default_path);
    Settings::write_default(&path, force).map_err(CliError::config)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
