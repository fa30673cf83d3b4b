use std::sync::{PoisonError, RwLock};

use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::repo_types::{FoodEntry, Nutrient};

/// Append-only, in-memory food log for one session.
#[derive(Debug, Default)]
pub struct FoodLog {
    entries: RwLock<Vec<FoodEntry>>,
}

impl FoodLog {
    pub fn with_entries(entries: Vec<FoodEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Appends all entries at once and returns the new log length.
    pub fn append(&self, new_entries: Vec<FoodEntry>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        debug!(added = new_entries.len(), "appending food entries");
        entries.extend(new_entries);
        entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<FoodEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All entries, newest first.
    pub fn history(&self) -> Vec<FoodEntry> {
        let mut out = self.snapshot();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }
}

/// Demo entries logged a few hours before `now`.
pub fn seed_entries(now: OffsetDateTime) -> Vec<FoodEntry> {
    vec![
        FoodEntry::new(
            "Grilled Salmon with Quinoa",
            450.0,
            now - Duration::hours(4),
            vec![
                Nutrient::macro_g("Protein", 35.0),
                Nutrient::macro_g("Fat", 18.0),
                Nutrient::macro_g("Carbs", 42.0),
                Nutrient::micro("Vitamin D", 15.0, "mcg"),
                Nutrient::micro("Iron", 2.1, "mg"),
            ],
        ),
        FoodEntry::new(
            "Greek Yogurt with Berries",
            220.0,
            now - Duration::hours(2),
            vec![
                Nutrient::macro_g("Protein", 15.0),
                Nutrient::macro_g("Fat", 5.0),
                Nutrient::macro_g("Carbs", 28.0),
                Nutrient::micro("Calcium", 200.0, "mg"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn append_grows_log() {
        let log = FoodLog::default();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        let now = datetime!(2025-03-10 12:00 UTC);
        assert_eq!(log.append(seed_entries(now)), 2);
        assert_eq!(log.append(vec![FoodEntry::new("Apple", 95.0, now, vec![])]), 3);
        assert!(!log.is_empty());
    }

    #[test]
    fn history_is_newest_first() {
        let now = datetime!(2025-03-10 12:00 UTC);
        let log = FoodLog::with_entries(seed_entries(now));
        let history = log.history();
        assert_eq!(history[0].name, "Greek Yogurt with Berries");
        assert_eq!(history[1].name, "Grilled Salmon with Quinoa");
    }

    #[test]
    fn seeded_ids_are_distinct() {
        let entries = seed_entries(datetime!(2025-03-10 12:00 UTC));
        assert_ne!(entries[0].id, entries[1].id);
        assert_eq!(entries[0].amount_of("Protein"), 35.0);
        assert_eq!(entries[0].amount_of("Sodium"), 0.0);
    }
}
