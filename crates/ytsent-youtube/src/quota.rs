//! Daily API budget ledger.
//!
//! The platform bills every call in quota units and resets the budget once
//! per day at midnight Pacific time, following daylight saving. [`QuotaLedger`]
//! mirrors that budget locally so calls are refused *before* they are made.
//!
//! All state lives behind a single mutex: the reset check, the limit check and
//! the charge happen under one lock acquisition, so two callers racing for the
//! last units can never both succeed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use ytsent_core::{AppConfig, QuotaState};

use crate::error::QuotaExceeded;

/// Daily unit budget in the reference deployment.
pub const DEFAULT_DAILY_LIMIT: u32 = 10_000;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed unit cost per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCosts {
    /// One `search.list` call, independent of result count.
    pub search: u32,
    /// One page of `commentThreads.list`.
    pub comment_page: u32,
}

impl Default for QuotaCosts {
    fn default() -> Self {
        Self {
            search: 100,
            comment_page: 1,
        }
    }
}

/// Zone whose local midnight starts a new quota day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetZone {
    /// An IANA zone; midnight follows its daylight-saving rules.
    Named(Tz),
    /// A fixed offset from UTC, for deployments that pin the boundary.
    Fixed(FixedOffset),
}

impl Default for ResetZone {
    fn default() -> Self {
        ResetZone::Named(chrono_tz::America::Los_Angeles)
    }
}

impl ResetZone {
    /// A fixed zone `hours` east of UTC, or `None` when out of range.
    #[must_use]
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(ResetZone::Fixed)
    }

    /// First local midnight in this zone strictly after `now`.
    #[must_use]
    pub fn next_reset_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ResetZone::Named(tz) => next_local_midnight(now, tz),
            ResetZone::Fixed(offset) => next_local_midnight(now, offset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    pub daily_limit: u32,
    pub costs: QuotaCosts,
    pub reset_zone: ResetZone,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            costs: QuotaCosts::default(),
            reset_zone: ResetZone::default(),
        }
    }
}

impl QuotaConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            daily_limit: config.quota_daily_limit,
            costs: QuotaCosts {
                search: config.quota_search_cost,
                comment_page: config.quota_comment_page_cost,
            },
            reset_zone: config
                .quota_reset_utc_offset_hours
                .and_then(ResetZone::from_utc_offset_hours)
                .unwrap_or(ResetZone::Named(config.quota_reset_timezone)),
        }
    }
}

fn next_local_midnight<Z: TimeZone>(now: DateTime<Utc>, zone: &Z) -> DateTime<Utc> {
    let local_date = now.with_timezone(zone).date_naive();
    let Some(next_date) = local_date.succ_opt() else {
        return now + Duration::days(1);
    };
    let midnight = next_date.and_time(NaiveTime::MIN);
    // Zones that skip midnight on a transition day start it at the first
    // local time that exists.
    (0..=2)
        .find_map(|h| {
            zone.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .map_or_else(|| now + Duration::days(1), |dt| dt.with_timezone(&Utc))
}

#[derive(Debug)]
struct LedgerState {
    used: u32,
    reset_at: DateTime<Utc>,
    /// Incremented on every reset so outstanding holds from a previous day
    /// do not refund into the new one.
    epoch: u64,
    /// Set when the platform reported the budget spent; holds no longer
    /// refund until the next reset.
    exhausted: bool,
}

/// Process-wide ledger of quota units consumed today.
pub struct QuotaLedger {
    config: QuotaConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<LedgerState>,
}

impl std::fmt::Debug for QuotaLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaLedger")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl QuotaLedger {
    #[must_use]
    pub fn new(config: QuotaConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(config: QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        let reset_at = config.reset_zone.next_reset_after(clock.now());
        Self {
            config,
            clock,
            state: Mutex::new(LedgerState {
                used: 0,
                reset_at,
                epoch: 0,
                exhausted: false,
            }),
        }
    }

    #[must_use]
    pub fn costs(&self) -> QuotaCosts {
        self.config.costs
    }

    #[must_use]
    pub fn daily_limit(&self) -> u32 {
        self.config.daily_limit
    }

    /// Charges `cost` units, or rejects without charging anything if the
    /// charge would exceed the daily limit.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaExceeded`] when `used + cost > daily_limit`.
    pub fn reserve(&self, cost: u32) -> Result<(), QuotaExceeded> {
        let mut state = self.lock();
        self.reset_if_due(&mut state);
        self.try_charge(&mut state, cost)
    }

    /// Charges `cost` units and returns a guard that refunds them on drop
    /// unless [`QuotaHold::commit`] is called.
    ///
    /// Used around external calls so that a call which fails or is cancelled
    /// before its response arrives is not billed.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaExceeded`] when `used + cost > daily_limit`.
    pub fn hold(&self, cost: u32) -> Result<QuotaHold<'_>, QuotaExceeded> {
        let mut state = self.lock();
        self.reset_if_due(&mut state);
        self.try_charge(&mut state, cost)?;
        Ok(QuotaHold {
            ledger: self,
            cost,
            epoch: state.epoch,
            committed: false,
        })
    }

    /// Snapshot of the ledger after applying any due reset.
    #[must_use]
    pub fn current_state(&self) -> QuotaState {
        let mut state = self.lock();
        self.reset_if_due(&mut state);
        QuotaState {
            used: state.used,
            daily_limit: self.config.daily_limit,
            reset_at: state.reset_at,
        }
    }

    /// Applies the daily reset if the boundary has passed. Returns `true` if
    /// a reset happened.
    pub fn maybe_reset(&self) -> bool {
        let mut state = self.lock();
        self.reset_if_due(&mut state)
    }

    /// Marks today's budget as fully spent.
    ///
    /// Called when the platform rejects a call for quota although the local
    /// ledger still had room, e.g. because another process shares the key.
    /// Returns the rejection to report for the call that triggered it.
    pub fn exhaust(&self, requested: u32) -> QuotaExceeded {
        let mut state = self.lock();
        self.reset_if_due(&mut state);
        let limit = self.config.daily_limit;
        tracing::warn!(
            requested,
            used = state.used,
            limit,
            "platform reported quota exhausted; closing today's budget"
        );
        state.used = state.used.max(limit);
        state.exhausted = true;
        QuotaExceeded {
            requested,
            used: state.used,
            limit,
            reset_at: state.reset_at,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset_if_due(&self, state: &mut LedgerState) -> bool {
        let now = self.clock.now();
        if now < state.reset_at {
            return false;
        }
        let previous_used = state.used;
        state.used = 0;
        state.reset_at = self.config.reset_zone.next_reset_after(now);
        state.epoch += 1;
        state.exhausted = false;
        tracing::info!(
            previous_used,
            next_reset_at = %state.reset_at,
            "daily quota reset"
        );
        true
    }

    fn try_charge(&self, state: &mut LedgerState, cost: u32) -> Result<(), QuotaExceeded> {
        let limit = self.config.daily_limit;
        let fits = state
            .used
            .checked_add(cost)
            .is_some_and(|total| total <= limit);
        if !fits {
            tracing::warn!(
                requested = cost,
                used = state.used,
                limit,
                "quota reservation rejected"
            );
            return Err(QuotaExceeded {
                requested: cost,
                used: state.used,
                limit,
                reset_at: state.reset_at,
            });
        }
        state.used += cost;
        tracing::debug!(charged = cost, used = state.used, limit, "quota reserved");
        Ok(())
    }

    fn refund(&self, cost: u32, epoch: u64) {
        let mut state = self.lock();
        self.reset_if_due(&mut state);
        if state.epoch != epoch || state.exhausted {
            return;
        }
        state.used = state.used.saturating_sub(cost);
        tracing::debug!(refunded = cost, used = state.used, "quota hold released");
    }
}

/// Outstanding charge from [`QuotaLedger::hold`].
#[must_use = "dropping a hold without committing refunds its charge"]
#[derive(Debug)]
pub struct QuotaHold<'a> {
    ledger: &'a QuotaLedger,
    cost: u32,
    epoch: u64,
    committed: bool,
}

impl QuotaHold<'_> {
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Keeps the charge.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for QuotaHold<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ledger.refund(self.cost, self.epoch);
        }
    }
}
