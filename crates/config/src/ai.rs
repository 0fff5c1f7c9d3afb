// AI credentials and resolved provider configuration
//
// API keys come from environment variables only:
// 1. The variable named by `ai.api_key_env` (default PAIRMATCH_API_KEY)
// 2. OPENAI_API_KEY
//
// Keys are NEVER stored in settings.toml and never printed.

use std::env;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::settings::AiSettings;

/// Default primary variable
pub const DEFAULT_KEY_ENV: &str = "PAIRMATCH_API_KEY";

/// Checked when the primary variable is unset or empty
pub const FALLBACK_KEY_ENV: &str = "OPENAI_API_KEY";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
    /// Variable the key was read from
    pub var: Option<String>,
}

impl fmt::Debug for KeyLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLookup")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .field("var", &self.var)
            .finish()
    }
}

/// Get the API key from `primary_env`, then OPENAI_API_KEY.
pub fn get_api_key(primary_env: &str) -> KeyLookup {
    lookup_with(primary_env, |name| env::var(name).ok())
}

fn lookup_with(primary_env: &str, var: impl Fn(&str) -> Option<String>) -> KeyLookup {
    let mut candidates = vec![primary_env];
    if primary_env != FALLBACK_KEY_ENV {
        candidates.push(FALLBACK_KEY_ENV);
    }

    for name in candidates {
        if let Some(key) = var(name) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Environment,
                    var: Some(name.to_string()),
                };
            }
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
        var: None,
    }
}

// ============================================================================
// Resolved AI Configuration
// ============================================================================

/// Status of the AI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiConfigStatus {
    /// Key present; requests can be made
    Ready,
    /// No key in any of the checked variables
    MissingKey,
}

impl AiConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The effective AI configuration, settings plus credential.
#[derive(Clone)]
pub struct ResolvedAiConfig {
    pub model: String,
    /// Base URL without trailing slash
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    /// Variable the key came from, if any
    pub key_var: Option<String>,
    /// Variable the user is expected to set
    pub key_env: String,
    pub status: AiConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedAiConfig {
    pub fn from_settings(settings: &AiSettings) -> Self {
        Self::from_lookup(settings, get_api_key(&settings.api_key_env))
    }

    fn from_lookup(settings: &AiSettings, lookup: KeyLookup) -> Self {
        let (status, blocking_reason) = match lookup.key {
            Some(_) => (AiConfigStatus::Ready, None),
            None => (
                AiConfigStatus::MissingKey,
                Some(if settings.api_key_env == FALLBACK_KEY_ENV {
                    format!("No API key found. Set {FALLBACK_KEY_ENV}")
                } else {
                    format!("No API key found. Set {} or {FALLBACK_KEY_ENV}", settings.api_key_env)
                }),
            ),
        };

        Self {
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_secs),
            api_key: lookup.key,
            key_source: lookup.source,
            key_var: lookup.var,
            key_env: settings.api_key_env.clone(),
            status,
            blocking_reason,
        }
    }
}

impl fmt::Debug for ResolvedAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAiConfig")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("key_source", &self.key_source)
            .field("key_var", &self.key_var)
            .field("status", &self.status)
            .finish()
    }
}

// ============================================================================
// Diagnostics (for CLI doctor)
// ============================================================================

/// What `doctor` reports. Never carries the key itself.
#[derive(Debug, Clone, Serialize)]
pub struct AiDiagnostics {
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub status: AiConfigStatus,
    pub key_present: bool,
    pub key_source: KeySource,
    pub key_var: Option<String>,
    pub key_env: String,
    pub blocking_reason: Option<String>,
}

impl AiDiagnostics {
    pub fn from_resolved(config: &ResolvedAiConfig) -> Self {
        Self {
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout.as_secs(),
            status: config.status,
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            key_var: config.key_var.clone(),
            key_env: config.key_env.clone(),
            blocking_reason: config.blocking_reason.clone(),
        }
    }
}

impl fmt::Display for AiDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AI Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        writeln!(f, "Model:             {}", self.model)?;
        writeln!(f, "Endpoint:          {}", self.endpoint)?;
        writeln!(f, "Temperature:       {}", self.temperature)?;
        writeln!(f, "Max tokens:        {}", self.max_tokens)?;
        writeln!(f, "Timeout:           {}s", self.timeout_secs)?;
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        match &self.key_var {
            Some(var) => writeln!(f, "Key variable:      {var}")?,
            None => writeln!(f, "Key variable:      {} (unset)", self.key_env)?,
        }
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Blocked:           {reason}")?;
        }
        Ok(())
    }
}
