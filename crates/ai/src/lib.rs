//! AI-mediated comparison.
//!
//! Blocking reqwest client (no Tokio runtime required) against any
//! OpenAI-compatible `/chat/completions` endpoint, plus the `Judge` that
//! turns a free-text report into a verdict.

pub mod client;
pub mod judge;

pub use client::{AiError, ChatClient};
pub use judge::AiJudge;
