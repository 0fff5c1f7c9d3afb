// Configuration loading
//
// Settings come from a TOML file; credentials only ever come from the
// process environment.

pub mod ai;
pub mod settings;

pub use ai::{AiConfigStatus, AiDiagnostics, KeySource, ResolvedAiConfig};
pub use settings::{AiSettings, ColumnSettings, ConfigError, Settings, SettingsSource, Strategy};
