// Run settings
// Loaded from ~/.config/pairmatch/settings.toml or an explicit --config path

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use pairmatch_core::cell::column_index;
use pairmatch_core::ColumnLayout;
use serde::{Deserialize, Serialize};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    Read { path: PathBuf, message: String },
    /// TOML syntax or type error.
    Parse(String),
    /// Values parsed but are unusable (bad column letter, overlapping columns).
    Invalid(String),
    /// Refusing to overwrite an existing settings file.
    Exists(PathBuf),
    /// Settings file could not be written.
    Write { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
            Self::Exists(path) => write!(f, "{} already exists", path.display()),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Settings
// ============================================================================

/// Verdict strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Normalized string equality, no network (default)
    #[default]
    Exact,
    /// AI-generated comparison report
    Ai,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Ai => "ai",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, Strategy::Ai)
    }
}

/// Column letters for each field. An empty `report` disables the audit column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSettings {
    pub product_a: String,
    pub product_b: String,
    pub publisher_a: String,
    pub publisher_b: String,
    pub status: String,
    pub instruction: String,
    pub report: String,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            product_a: "D".into(),
            product_b: "E".into(),
            publisher_a: "F".into(),
            publisher_b: "G".into(),
            status: "K".into(),
            instruction: "L".into(),
            report: "M".into(),
        }
    }
}

impl ColumnSettings {
    /// Resolve letters to a validated layout.
    pub fn layout(&self) -> Result<ColumnLayout, ConfigError> {
        let col = |field: &str, letters: &str| {
            column_index(letters).map_err(|e| ConfigError::Invalid(format!("columns.{field}: {e}")))
        };

        let report = if self.report.trim().is_empty() {
            None
        } else {
            Some(col("report", &self.report)?)
        };

        let layout = ColumnLayout {
            product_a: col("product_a", &self.product_a)?,
            product_b: col("product_b", &self.product_b)?,
            publisher_a: col("publisher_a", &self.publisher_a)?,
            publisher_b: col("publisher_b", &self.publisher_b)?,
            status: col("status", &self.status)?,
            instruction: col("instruction", &self.instruction)?,
            report,
        };
        layout
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("columns: {e}")))?;
        Ok(layout)
    }
}

/// AI provider settings. Any OpenAI-compatible chat completions endpoint works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Model identifier
    pub model: String,

    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token cap
    pub max_tokens: u32,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            endpoint: "https://api.openai.com/v1".into(),
            temperature: 0.7,
            max_tokens: 1500,
            timeout_secs: 30,
            api_key_env: crate::ai::DEFAULT_KEY_ENV.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Verdict strategy
    pub strategy: Strategy,

    /// Pause between judged rows, in milliseconds
    pub delay_ms: u64,

    pub columns: ColumnSettings,

    pub ai: AiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: Strategy::Exact,
            delay_ms: 500,
            columns: ColumnSettings::default(),
            ai: AiSettings::default(),
        }
    }
}

/// Where the effective settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// Explicit path or the default file
    File(PathBuf),
    /// No file found; built-in defaults
    Defaults,
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::File(path) => write!(f, "{}", path.display()),
            SettingsSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

const DEFAULT_SETTINGS_TOML: &str = r#"# pairmatch settings

# Verdict strategy: "exact" (normalized string equality) or "ai"
strategy = "exact"

# Pause between judged rows, in milliseconds
delay_ms = 500

# Column letters. Row 1 is the header row and is never processed.
[columns]
product_a = "D"
product_b = "E"
publisher_a = "F"
publisher_b = "G"
status = "K"
instruction = "L"
# Raw AI report / error detail. Set to "" to disable.
report = "M"

# Any OpenAI-compatible chat completions endpoint.
# The API key is read from the environment variable named below
# (falling back to OPENAI_API_KEY). It is never stored in this file.
[ai]
model = "gpt-4o"
endpoint = "https://api.openai.com/v1"
temperature = 0.7
max_tokens = 1500
timeout_secs = 30
api_key_env = "PAIRMATCH_API_KEY"
"#;

impl Settings {
    /// Default settings file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pairmatch")
            .join("settings.toml")
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from an explicit path (must exist) or the default path (optional).
    pub fn load(explicit: Option<&Path>) -> Result<(Self, SettingsSource), ConfigError> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !required && !path.exists() {
            return Ok((Self::default(), SettingsSource::Defaults));
        }

        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents)?;
        Ok((settings, SettingsSource::File(path)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.columns.layout()?;
        if self.ai.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("ai.api_key_env must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::Invalid(format!(
                "ai.temperature must be between 0 and 2, got {}",
                self.ai.temperature
            )));
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::Invalid("ai.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Write the commented default settings file.
    pub fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::Exists(path.to_path_buf()));
        }
        let write_err = |e: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        fs::write(path, DEFAULT_SETTINGS_TOML).map_err(write_err)
    }
}
