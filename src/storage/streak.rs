use super::RecordStore;
use chrono::{Days, NaiveDate};

/// Longest run of consecutive study days ever observed.
///
/// The value only grows: [`StreakCounter::refresh`] folds the current run
/// into it with `max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakCounter {
    max_continuous_days: u32,
}

impl StreakCounter {
    pub fn new(max_continuous_days: u32) -> Self {
        Self { max_continuous_days }
    }

    pub fn max_continuous_days(&self) -> u32 {
        self.max_continuous_days
    }

    /// Consecutive days ending at `today` whose `study_hours` is non-zero.
    pub fn current_streak(store: &RecordStore, today: NaiveDate) -> u32 {
        let mut days = 0;
        let mut cursor = Some(today);
        while let Some(date) = cursor {
            match store.peek(date) {
                Some(record) if record.study_hours > 0 => days += 1,
                _ => break,
            }
            cursor = date.checked_sub_days(Days::new(1));
        }
        days
    }

    pub fn refresh(&mut self, store: &RecordStore, today: NaiveDate) -> u32 {
        let current = Self::current_streak(store, today);
        self.max_continuous_days = self.max_continuous_days.max(current);
        self.max_continuous_days
    }
}
