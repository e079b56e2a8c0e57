use crate::core::DayRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// In-memory map from calendar date to the day's record.
///
/// Entries are created lazily and never removed; only the whole map can be
/// swapped out (see [`RecordStore::replace_all`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    days: BTreeMap<NaiveDate, DayRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `date`, inserting an empty one first if absent.
    pub fn get(&mut self, date: NaiveDate) -> &mut DayRecord {
        self.days.entry(date).or_default()
    }

    /// Record for `date` without materializing it.
    pub fn peek(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    pub fn set(&mut self, date: NaiveDate, record: DayRecord) {
        self.days.insert(date, record);
    }

    /// Insert only when `date` has no record yet. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, date: NaiveDate, record: DayRecord) -> bool {
        match self.days.entry(date) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    /// Entries in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayRecord)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Swap the whole history for `other`.
    pub fn replace_all(&mut self, other: RecordStore) {
        self.days = other.days;
    }
}

impl FromIterator<(NaiveDate, DayRecord)> for RecordStore {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, DayRecord)>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}
