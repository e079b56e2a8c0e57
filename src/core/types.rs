use super::{Result, StoreError};
use std::collections::BTreeMap;

/// Highest valid hour slot in a day timeline.
pub const MAX_HOUR: u8 = 23;

/// Activity label that counts toward `study_hours` unless configured otherwise.
pub const DEFAULT_STUDY_KIND: &str = "study";

/// One scheduled hour slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Free-form label such as "study", "meal" or "sleep".
    pub kind: String,
    pub completed: bool,
}

impl Activity {
    pub fn new(kind: impl Into<String>, completed: bool) -> Self {
        Self {
            kind: kind.into(),
            completed,
        }
    }

    fn counts_as_study(&self, study_kind: &str) -> bool {
        self.completed && self.kind == study_kind
    }
}

/// Everything recorded for one calendar day.
///
/// The three counters are stored, not derived on read. The mutation methods
/// below keep them in step with `timeline` by calling [`DayRecord::recount`];
/// writing the fields directly (or loading them from disk) keeps whatever
/// values were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayRecord {
    pub study_hours: u32,
    pub completed_count: u32,
    pub total_count: u32,
    pub timeline: BTreeMap<u8, Activity>,
}

impl DayRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `kind` at `hour`, replacing whatever occupied the slot.
    pub fn schedule(
        &mut self,
        hour: u8,
        kind: impl Into<String>,
        completed: bool,
        study_kind: &str,
    ) -> Result<()> {
        validate_hour(hour)?;
        self.timeline.insert(hour, Activity::new(kind, completed));
        self.recount(study_kind);
        Ok(())
    }

    /// Remove the activity at `hour`. Returns the removed activity, if any.
    pub fn unschedule(&mut self, hour: u8, study_kind: &str) -> Result<Option<Activity>> {
        validate_hour(hour)?;
        let removed = self.timeline.remove(&hour);
        self.recount(study_kind);
        Ok(removed)
    }

    /// Flip the completion flag of an existing slot.
    /// Returns `false` when nothing is scheduled at `hour`.
    pub fn set_completed(&mut self, hour: u8, completed: bool, study_kind: &str) -> Result<bool> {
        validate_hour(hour)?;
        let found = match self.timeline.get_mut(&hour) {
            Some(activity) => {
                activity.completed = completed;
                true
            }
            None => false,
        };
        self.recount(study_kind);
        Ok(found)
    }

    /// Recompute all counters from the timeline.
    pub fn recount(&mut self, study_kind: &str) {
        let (study, completed) = self
            .timeline
            .values()
            .fold((0u32, 0u32), |(study, completed), activity| {
                (
                    study + u32::from(activity.counts_as_study(study_kind)),
                    completed + u32::from(activity.completed),
                )
            });
        self.study_hours = study;
        self.completed_count = completed;
        self.total_count = self.timeline.len() as u32;
    }

    /// True when the counters agree with the timeline.
    pub fn is_consistent(&self, study_kind: &str) -> bool {
        let mut copy = self.clone();
        copy.recount(study_kind);
        copy == *self
    }
}

fn validate_hour(hour: u8) -> Result<()> {
    if hour > MAX_HOUR {
        return Err(StoreError::InvalidHour(hour));
    }
    Ok(())
}
