//! Display-ready orderings over entries and projects.
//!
//! # Responsibility
//! - Group entries by calendar month (most recent month first).
//! - Partition an entry's projects into urgency buckets.
//! - Answer calendar day queries (active-on, month grid).
//!
//! # Invariants
//! - Month groups are keyed by `year * 12 + month0`, never by a label, so
//!   equal month names in different years cannot merge or misorder.
//! - Within a group entries are ordered by `start_date` descending; ties keep
//!   input order.
//! - Bucketing preserves relative insertion order inside each bucket.

use crate::model::entry::Entry;
use crate::model::project::Project;
use crate::schedule::{classify_project, DeadlineBucket};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Sortable calendar month key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey(i32);

impl MonthKey {
    /// Returns `None` for months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        let month0 = i32::try_from(month - 1).ok()?;
        year.checked_mul(12)?.checked_add(month0).map(Self)
    }

    pub fn of(instant: DateTime<Utc>) -> Self {
        Self(instant.year() * 12 + instant.month0() as i32)
    }

    pub fn year(self) -> i32 {
        self.0.div_euclid(12)
    }

    /// Month number in `1..=12`.
    pub fn month(self) -> u32 {
        self.0.rem_euclid(12) as u32 + 1
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
    }

    /// Human label such as `May 2024`.
    pub fn label(self) -> String {
        match self.first_day() {
            Some(day) => day.format("%B %Y").to_string(),
            None => format!("{}-{:02}", self.year(), self.month()),
        }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Entries that start in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup<'a> {
    pub key: MonthKey,
    pub entries: Vec<&'a Entry>,
}

/// Groups entries by the month of `start_date`, most recent month first.
pub fn group_entries_by_month<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
) -> Vec<MonthGroup<'a>> {
    let mut groups: BTreeMap<MonthKey, Vec<&'a Entry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(MonthKey::of(entry.start_date))
            .or_default()
            .push(entry);
    }

    groups
        .into_iter()
        .rev()
        .map(|(key, mut entries)| {
            entries.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            MonthGroup { key, entries }
        })
        .collect()
}

/// An entry's projects partitioned by deadline urgency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectBuckets<'a> {
    pub past_deadline: Vec<&'a Project>,
    pub upcoming_deadline: Vec<&'a Project>,
    pub other: Vec<&'a Project>,
}

impl<'a> ProjectBuckets<'a> {
    pub fn len(&self) -> usize {
        self.past_deadline.len() + self.upcoming_deadline.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buckets in render order: past, upcoming, other.
    pub fn in_display_order(&self) -> [(DeadlineBucket, &[&'a Project]); 3] {
        [
            (DeadlineBucket::PastDeadline, self.past_deadline.as_slice()),
            (
                DeadlineBucket::UpcomingDeadline,
                self.upcoming_deadline.as_slice(),
            ),
            (DeadlineBucket::Other, self.other.as_slice()),
        ]
    }
}

pub fn bucket_projects(
    now: DateTime<Utc>,
    projects: &[Project],
    window: Duration,
) -> ProjectBuckets<'_> {
    let mut buckets = ProjectBuckets::default();
    for project in projects {
        match classify_project(now, project, window) {
            DeadlineBucket::PastDeadline => buckets.past_deadline.push(project),
            DeadlineBucket::UpcomingDeadline => buckets.upcoming_deadline.push(project),
            DeadlineBucket::Other => buckets.other.push(project),
        }
    }
    buckets
}

/// Returns whether `date` lies within the entry's days, both ends inclusive.
///
/// An inverted range is treated as invalid data and never matches.
pub fn is_entry_active_on(entry: &Entry, date: NaiveDate) -> bool {
    if entry.end_date < entry.start_date {
        return false;
    }
    let first = entry.start_date.date_naive();
    let last = entry.end_date.date_naive();
    first <= date && date <= last
}

pub fn entries_on<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    date: NaiveDate,
) -> Vec<&'a Entry> {
    entries
        .into_iter()
        .filter(|entry| is_entry_active_on(entry, date))
        .collect()
}

pub fn has_entries_on<'a>(entries: impl IntoIterator<Item = &'a Entry>, date: NaiveDate) -> bool {
    entries
        .into_iter()
        .any(|entry| is_entry_active_on(entry, date))
}

/// One cell of a month calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub has_entries: bool,
}

/// Builds the Sunday-first grid covering a whole month.
///
/// Returns `None` for an invalid month or a date outside chrono's range.
pub fn month_grid<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    year: i32,
    month: u32,
) -> Option<Vec<CalendarDay>> {
    let key = MonthKey::new(year, month)?;
    let first = key.first_day()?;
    let last = MonthKey(key.0.checked_add(1)?).first_day()?.pred_opt()?;

    let lead = u64::from(first.weekday().num_days_from_sunday());
    let trail = 6 - u64::from(last.weekday().num_days_from_sunday());
    let grid_start = first.checked_sub_days(Days::new(lead))?;
    let grid_end = last.checked_add_days(Days::new(trail))?;

    let entries: Vec<&Entry> = entries.into_iter().collect();
    let mut days = Vec::new();
    let mut cursor = grid_start;
    while cursor <= grid_end {
        days.push(CalendarDay {
            date: cursor,
            in_month: cursor.month() == month && cursor.year() == year,
            has_entries: has_entries_on(entries.iter().copied(), cursor),
        });
        cursor = cursor.succ_opt()?;
    }
    Some(days)
}

#[cfg(test)]
mod tests {
    use super::MonthKey;
    use chrono::{TimeZone, Utc};

    #[test]
    fn month_key_round_trips_year_and_month() {
        let key = MonthKey::of(Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap());
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 3);
        assert_eq!(key, MonthKey::new(2024, 3).unwrap());
        assert_eq!(key.label(), "March 2024");
        assert_eq!(key.to_string(), "2024-03");
    }

    #[test]
    fn month_key_rejects_out_of_range_month() {
        assert!(MonthKey::new(2024, 0).is_none());
        assert!(MonthKey::new(2024, 13).is_none());
    }

    #[test]
    fn december_precedes_next_january() {
        let december = MonthKey::new(2023, 12).unwrap();
        let january = MonthKey::new(2024, 1).unwrap();
        assert!(december < january);
    }
}
