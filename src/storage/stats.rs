//! Read-only aggregates over the whole record history.

use super::RecordStore;
use crate::core::DayRecord;
use chrono::{Days, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudyStats {
    pub total_study_days: u32,
    pub total_study_hours: u64,
    pub total_activities: u64,
    pub completed_activities: u64,
}

impl StudyStats {
    pub fn collect(store: &RecordStore) -> Self {
        store.iter().fold(
            Self {
                total_study_days: 0,
                total_study_hours: 0,
                total_activities: 0,
                completed_activities: 0,
            },
            |mut acc, (_, day)| {
                if day.study_hours > 0 {
                    acc.total_study_days += 1;
                }
                acc.total_study_hours += u64::from(day.study_hours);
                acc.total_activities += u64::from(day.total_count);
                acc.completed_activities += u64::from(day.completed_count);
                acc
            },
        )
    }

    /// Mean study hours over days that had any study at all.
    pub fn average_study_hours_per_day(&self) -> f64 {
        if self.total_study_days == 0 {
            return 0.0;
        }
        self.total_study_hours as f64 / f64::from(self.total_study_days)
    }

    /// Completed activities as a percentage of all scheduled ones.
    pub fn completion_rate(&self) -> f64 {
        if self.total_activities == 0 {
            return 0.0;
        }
        self.completed_activities as f64 / self.total_activities as f64 * 100.0
    }
}

/// Entries for the `days` days ending at `today`, newest first.
/// Dates with no record are skipped, not materialized.
pub fn recent(store: &RecordStore, today: NaiveDate, days: u32) -> Vec<(NaiveDate, &DayRecord)> {
    (0..days)
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .filter_map(|date| store.peek(date).map(|record| (date, record)))
        .collect()
}
