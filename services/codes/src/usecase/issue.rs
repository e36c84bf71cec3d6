use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::authority::CodeAuthority;
use crate::error::CodesServiceError;

/// A freshly issued code with its countdown, computed when issued.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in_secs: i64,
}

pub struct IssueCodeUseCase {
    pub authority: Arc<CodeAuthority>,
}

impl IssueCodeUseCase {
    pub fn execute(&self) -> Result<IssuedCode, CodesServiceError> {
        let code = self.authority.generate_code()?;
        let now = self.authority.now();
        Ok(IssuedCode {
            expires_in_secs: rolegate_core::serde::seconds_until(code.expires_at, now),
            expires_at: code.expires_at,
            code: code.value,
        })
    }
}
