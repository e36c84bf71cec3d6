use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default length of one cycle; also how long a granted role is held.
pub const DEFAULT_CYCLE_DURATION_SECS: u64 = 3 * 60 * 60;

/// Upper bound on redraws when a candidate collides with a live code.
pub const MAX_DRAW_ATTEMPTS: usize = 64;

/// One global validity epoch. Every code issued in it expires with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Time-ordered opaque id (UUID v7).
    pub id: Uuid,
    /// Incremented on every rollover; lets the renewal timer detect that a
    /// lazy reset already replaced the cycle it was armed for.
    pub epoch: u64,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Cycle {
    pub fn start(epoch: u64, now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            id: Uuid::now_v7(),
            epoch,
            started_at: now,
            expires_at: now + duration,
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Opaque platform-supplied identifier of whoever redeems a code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claimant(String);

impl Claimant {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Claimant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use verification code issued under one cycle.
#[derive(Debug, Clone)]
pub struct Code {
    pub value: String,
    pub cycle_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub claimed_by: Option<Claimant>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Code {
    pub fn issue(value: String, cycle: &Cycle) -> Self {
        Self {
            value,
            cycle_id: cycle.id,
            expires_at: cycle.expires_at,
            consumed: false,
            claimed_by: None,
            claimed_at: None,
        }
    }
}

/// Why a verification attempt did not consume a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    InvalidCode,
    AlreadyUsed,
    Expired,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCode => "INVALID_CODE",
            Self::AlreadyUsed => "ALREADY_USED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::InvalidCode => "Invalid code.",
            Self::AlreadyUsed => "Code already used.",
            Self::Expired => "Code expired.",
        };
        f.write_str(message)
    }
}

/// Outcome of `verify_code`. Rejections are ordinary values, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Rejected(RejectReason),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Valid => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// A role handed to a claimant, held until `revoke_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role_id: String,
    pub claimant: Claimant,
    pub granted_at: DateTime<Utc>,
    pub revoke_at: DateTime<Utc>,
}
