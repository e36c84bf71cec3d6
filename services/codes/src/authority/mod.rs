//! The code authority: one in-memory owner of the current cycle and the code
//! ledger. Every operation takes the same lock, heals a stale cycle first and
//! then does its work, so a rollover can never interleave with a claim.

pub mod format;
pub mod ledger;
pub mod renewal;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ports::Clock;
use crate::domain::types::{Claimant, Code, Cycle, MAX_DRAW_ATTEMPTS, RejectReason, Verification};
use crate::error::CodesServiceError;

use self::format::CodeFormat;
use self::ledger::Ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rollover {
    /// The cycle ran out (timer or lazy check). Its codes are retired.
    Natural,
    /// Explicit refresh. Its codes are forgotten outright.
    Forced,
}

struct AuthorityState {
    cycle: Cycle,
    ledger: Ledger,
}

pub struct CodeAuthority {
    format: CodeFormat,
    cycle_duration: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<AuthorityState>,
    cycles: watch::Sender<Cycle>,
}

impl CodeAuthority {
    pub fn new(format: CodeFormat, cycle_duration: Duration, clock: Arc<dyn Clock>) -> Self {
        let cycle = Cycle::start(1, clock.now(), cycle_duration);
        info!(cycle_id = %cycle.id, expires_at = %cycle.expires_at, "initial cycle started");
        let (cycles, _) = watch::channel(cycle.clone());
        Self {
            format,
            cycle_duration,
            clock,
            state: Mutex::new(AuthorityState {
                cycle,
                ledger: Ledger::default(),
            }),
            cycles,
        }
    }

    pub fn format(&self) -> &CodeFormat {
        &self.format
    }

    pub fn cycle_duration(&self) -> Duration {
        self.cycle_duration
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Receives every new cycle as it replaces the previous one.
    pub fn subscribe(&self) -> watch::Receiver<Cycle> {
        self.cycles.subscribe()
    }

    /// The live cycle, rolled over first if it has run out.
    pub fn current_cycle(&self) -> Cycle {
        let mut state = self.lock();
        self.ensure_fresh(&mut state);
        state.cycle.clone()
    }

    /// End the current cycle now, dropping every code issued under it.
    pub fn refresh_cycle(&self) -> Cycle {
        let mut state = self.lock();
        let now = self.clock.now();
        self.rollover(&mut state, now, Rollover::Forced);
        state.cycle.clone()
    }

    /// Timer entry point. Rolls over only if `epoch` is still current and has
    /// run out; a cycle already replaced by a lazy check is left alone.
    pub fn rollover_if_due(&self, epoch: u64) -> bool {
        let mut state = self.lock();
        if state.cycle.epoch != epoch {
            debug!(armed = epoch, current = state.cycle.epoch, "renewal timer superseded");
            return false;
        }
        let now = self.clock.now();
        if !state.cycle.is_stale(now) {
            return false;
        }
        self.rollover(&mut state, now, Rollover::Natural);
        true
    }

    /// Issue a fresh code unique within the live cycle.
    pub fn generate_code(&self) -> Result<Code, CodesServiceError> {
        let mut state = self.lock();
        self.ensure_fresh(&mut state);

        let mut rng = rand::rng();
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let value = self.format.draw(&mut rng);
            if state.ledger.contains(&value) {
                continue;
            }
            let code = Code::issue(value, &state.cycle);
            state.ledger.insert(code.clone());
            return Ok(code);
        }

        Err(CodesServiceError::CodeSpaceExhausted {
            attempts: MAX_DRAW_ATTEMPTS,
            live: state.ledger.len(),
        })
    }

    /// Validate `value` and, if redeemable, consume it for `claimant`.
    ///
    /// At most one call per value ever returns `Verification::Valid`.
    pub fn verify_code(&self, value: &str, claimant: &Claimant) -> Verification {
        let mut state = self.lock();
        let now = self.ensure_fresh(&mut state);

        if !self.format.is_well_formed(value) {
            return Verification::Rejected(RejectReason::InvalidCode);
        }
        state.ledger.consume(value, claimant, now)
    }

    /// Look up a live code without consuming it.
    pub fn code(&self, value: &str) -> Option<Code> {
        self.lock().ledger.get(value).cloned()
    }

    /// Number of codes issued in the live cycle.
    pub fn live_codes(&self) -> usize {
        self.lock().ledger.len()
    }

    fn lock(&self) -> MutexGuard<'_, AuthorityState> {
        // The state is consistent after every statement that can panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Single staleness guard shared by every operation. Returns the `now`
    /// it compared against.
    fn ensure_fresh(&self, state: &mut AuthorityState) -> DateTime<Utc> {
        let now = self.clock.now();
        if state.cycle.is_stale(now) {
            self.rollover(state, now, Rollover::Natural);
        }
        now
    }

    fn rollover(&self, state: &mut AuthorityState, now: DateTime<Utc>, kind: Rollover) {
        let previous = state.cycle.id;
        let dropped = state.ledger.len();
        match kind {
            Rollover::Natural => state.ledger.retire(),
            Rollover::Forced => state.ledger.clear(),
        }
        state.cycle = Cycle::start(state.cycle.epoch + 1, now, self.cycle_duration);
        self.cycles.send_replace(state.cycle.clone());

        match kind {
            Rollover::Natural => info!(
                previous = %previous,
                cycle_id = %state.cycle.id,
                epoch = state.cycle.epoch,
                retired = dropped,
                "cycle expired, new cycle started"
            ),
            Rollover::Forced => warn!(
                previous = %previous,
                cycle_id = %state.cycle.id,
                epoch = state.cycle.epoch,
                invalidated = dropped,
                "cycle refreshed, all codes invalidated"
            ),
        }
    }
}
