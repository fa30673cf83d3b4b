//! Per-session state: profile, food log, the analysis awaiting review and the
//! in-flight flag. Created at startup and owned by [`crate::state::AppState`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::analysis::{into_food_entries, AnalysisError, AnalysisResult};
use crate::clock::Clock;
use crate::logs::{seed_entries, FoodEntry, FoodLog};
use crate::nutrition::{aggregate_day, calculate_rda, DailyTotals, RdaTarget};
use crate::profile::Profile;

pub struct Session {
    profile: RwLock<Profile>,
    log: FoodLog,
    pending: Mutex<Option<AnalysisResult>>,
    analyzing: AtomicBool,
    clock: Clock,
}

/// Holds the session's single analysis slot; frees it on drop.
#[must_use]
pub struct AnalysisGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Session {
    pub fn new(profile: Profile, entries: Vec<FoodEntry>, clock: Clock) -> Self {
        Self {
            profile: RwLock::new(profile),
            log: FoodLog::with_entries(entries),
            pending: Mutex::new(None),
            analyzing: AtomicBool::new(false),
            clock,
        }
    }

    /// Default profile, optionally seeded with demo entries.
    pub fn start(clock: Clock, seed_demo: bool) -> Self {
        let entries = if seed_demo {
            seed_entries(clock.now())
        } else {
            Vec::new()
        };
        info!(seeded = entries.len(), "session started");
        Self::new(Profile::default(), entries, clock)
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn profile(&self) -> Profile {
        self.profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Caller validates `profile` first.
    pub fn replace_profile(&self, profile: Profile) {
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = profile;
    }

    /// Recomputed on every call.
    pub fn rda(&self) -> RdaTarget {
        calculate_rda(&self.profile())
    }

    pub fn log(&self) -> &FoodLog {
        &self.log
    }

    pub fn today(&self) -> DailyTotals {
        aggregate_day(&self.log.snapshot(), self.now())
    }

    pub fn begin_analysis(&self) -> Result<AnalysisGuard<'_>, AnalysisError> {
        self.analyzing
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| AnalysisError::Busy)?;
        Ok(AnalysisGuard {
            flag: &self.analyzing,
        })
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing.load(Ordering::Acquire)
    }

    /// A newer result replaces one that was never reviewed.
    pub fn set_pending(&self, result: AnalysisResult) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.is_some() {
            debug!("replacing unreviewed analysis result");
        }
        *pending = Some(result);
    }

    pub fn pending(&self) -> Option<AnalysisResult> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dismiss_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Logs every item of the pending result, stamped with the confirmation time.
    pub fn confirm_pending(&self) -> Result<Vec<FoodEntry>, AnalysisError> {
        let result = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(AnalysisError::NothingPending)?;
        let entries = into_food_entries(&result, self.now());
        let len = self.log.append(entries.clone());
        info!(added = entries.len(), log_len = len, "analysis confirmed");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{parse_analysis, TWO_ITEMS};
    use crate::profile::Goal;

    fn session() -> Session {
        Session::start(Clock::utc(), true)
    }

    #[test]
    fn second_analysis_is_rejected_while_one_is_in_flight() {
        let s = session();
        let guard = s.begin_analysis().unwrap();
        assert!(s.is_analyzing());
        assert!(matches!(s.begin_analysis(), Err(AnalysisError::Busy)));
        drop(guard);
        assert!(!s.is_analyzing());
        assert!(s.begin_analysis().is_ok());
    }

    #[test]
    fn confirm_appends_one_entry_per_item() {
        let s = session();
        let before = s.log().len();
        s.set_pending(parse_analysis(TWO_ITEMS).unwrap());
        let added = s.confirm_pending().unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(s.log().len(), before + 2);
        assert_eq!(added[0].nutrients.len(), 3 + 2);
        assert_eq!(added[1].nutrients.len(), 3);
        assert!(s.pending().is_none());
        assert!(matches!(s.confirm_pending(), Err(AnalysisError::NothingPending)));
    }

    #[test]
    fn dismiss_leaves_log_untouched() {
        let s = session();
        let before = s.log().len();
        s.set_pending(parse_analysis(TWO_ITEMS).unwrap());
        assert!(s.dismiss_pending());
        assert!(!s.dismiss_pending());
        assert_eq!(s.log().len(), before);
    }

    #[test]
    fn rda_follows_profile_edits() {
        let s = session();
        let gain = s.rda().calories;
        let mut p = s.profile();
        p.goal = Goal::Maintenance;
        s.replace_profile(p);
        assert_eq!(s.rda().calories, gain - 300.0);
    }

    #[test]
    fn confirmed_entries_count_toward_today() {
        let s = Session::start(Clock::utc(), false);
        assert_eq!(s.today().calories, 0.0);
        s.set_pending(parse_analysis(TWO_ITEMS).unwrap());
        s.confirm_pending().unwrap();
        let today = s.today();
        assert_eq!(today.calories, 442.0);
        assert_eq!(today.vitamin_a, 160.0);
    }
}
