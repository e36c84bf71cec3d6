use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::types::{Claimant, Code, RejectReason, Verification};

/// Codes of the live cycle, plus the values of the cycle before it.
///
/// The retired generation only remembers whether each value was consumed, so
/// a code submitted just after its cycle ran out reports `EXPIRED` instead of
/// `INVALID_CODE`. It is replaced on the next natural rollover and dropped on
/// a forced refresh.
#[derive(Debug, Default)]
pub struct Ledger {
    live: HashMap<String, Code>,
    retired: HashMap<String, bool>,
}

impl Ledger {
    pub fn contains(&self, value: &str) -> bool {
        self.live.contains_key(value)
    }

    pub fn get(&self, value: &str) -> Option<&Code> {
        self.live.get(value)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Caller guarantees `code.value` is not already live.
    pub fn insert(&mut self, code: Code) {
        debug_assert!(!self.live.contains_key(&code.value));
        self.live.insert(code.value.clone(), code);
    }

    /// Check-then-mark for one claim. Must run under the authority lock.
    pub fn consume(&mut self, value: &str, claimant: &Claimant, now: DateTime<Utc>) -> Verification {
        let Some(code) = self.live.get_mut(value) else {
            return Verification::Rejected(match self.retired.get(value) {
                Some(true) => RejectReason::AlreadyUsed,
                Some(false) => RejectReason::Expired,
                None => RejectReason::InvalidCode,
            });
        };

        if code.consumed {
            return Verification::Rejected(RejectReason::AlreadyUsed);
        }
        if now > code.expires_at {
            return Verification::Rejected(RejectReason::Expired);
        }

        code.consumed = true;
        code.claimed_by = Some(claimant.clone());
        code.claimed_at = Some(now);
        Verification::Valid
    }

    /// Natural rollover: live codes become the retired generation.
    pub fn retire(&mut self) {
        self.retired = self
            .live
            .drain()
            .map(|(value, code)| (value, code.consumed))
            .collect();
    }

    /// Forced refresh: forget everything.
    pub fn clear(&mut self) {
        self.live.clear();
        self.retired.clear();
    }
}
