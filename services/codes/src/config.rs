use std::num::NonZeroU64;

use serde::Deserialize;

use rolegate_core::config::Config;

use crate::authority::format::{
    CodeFormat, DEFAULT_ALPHABET, DEFAULT_GROUP_SIZE, DEFAULT_SEPARATOR, DEFAULT_SYMBOLS,
};
use crate::domain::types::DEFAULT_CYCLE_DURATION_SECS;
use crate::error::CodesServiceError;

/// Codes service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct CodesConfig {
    /// TCP port to listen on (default 3120). Env var: `CODES_PORT`.
    #[serde(default = "default_port")]
    pub codes_port: u16,
    /// Cycle length in seconds; also how long a granted role is held.
    #[serde(default = "default_cycle_duration")]
    pub cycle_duration_secs: NonZeroU64,
    /// Shared secret for bot-facing and operator endpoints.
    pub internal_token: String,
    /// Role handed out on a successful claim. Claims still consume codes
    /// while this is unset.
    #[serde(default)]
    pub target_role_id: Option<String>,
    /// Bot endpoint that applies grants/revocations. Log-only when unset.
    #[serde(default)]
    pub role_webhook_url: Option<String>,
    /// Bearer token sent to the webhook. Required with `ROLE_WEBHOOK_URL`.
    #[serde(default)]
    pub role_webhook_token: Option<String>,
    #[serde(default = "default_alphabet")]
    pub code_alphabet: String,
    #[serde(default = "default_symbols")]
    pub code_symbols: u32,
    #[serde(default = "default_group_size")]
    pub code_group_size: u32,
    #[serde(default = "default_separator")]
    pub code_separator: char,
}

impl Config for CodesConfig {}

fn default_port() -> u16 {
    3120
}

fn default_cycle_duration() -> NonZeroU64 {
    NonZeroU64::new(DEFAULT_CYCLE_DURATION_SECS).unwrap_or(NonZeroU64::MIN)
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_owned()
}

fn default_symbols() -> u32 {
    DEFAULT_SYMBOLS as u32
}

fn default_group_size() -> u32 {
    DEFAULT_GROUP_SIZE as u32
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

impl CodesConfig {
    pub fn code_format(&self) -> Result<CodeFormat, CodesServiceError> {
        CodeFormat::new(
            &self.code_alphabet,
            self.code_symbols as usize,
            self.code_group_size as usize,
            self.code_separator,
        )
    }

    pub fn cycle_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cycle_duration_secs.get().min(i64::MAX as u64) as i64)
    }

    /// Blank optional vars count as unset.
    pub fn target_role(&self) -> Option<&str> {
        self.target_role_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn role_webhook(&self) -> Option<&str> {
        self.role_webhook_url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn role_webhook_token(&self) -> Option<&str> {
        self.role_webhook_token.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
