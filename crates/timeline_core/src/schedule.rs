//! Deadline urgency classification.
//!
//! # Responsibility
//! - Bucket projects (and entries) into past/upcoming/other relative to `now`.
//!
//! # Invariants
//! - Classification is a pure function of its arguments; callers pass `now`.
//! - Buckets are mutually exclusive and exhaustive.
//! - Only `Completed` is exempt from deadline buckets; `Canceled` still
//!   participates.

use crate::model::entry::Entry;
use crate::model::project::{Project, ProjectStatus};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Length of the "upcoming deadline" window.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Urgency bucket, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineBucket {
    PastDeadline,
    UpcomingDeadline,
    Other,
}

impl DeadlineBucket {
    pub fn label(self) -> &'static str {
        match self {
            Self::PastDeadline => "Past Deadline",
            Self::UpcomingDeadline => "Upcoming Deadline",
            Self::Other => "Other",
        }
    }
}

/// Default upcoming window as a duration.
pub fn default_upcoming_window() -> Duration {
    Duration::days(UPCOMING_WINDOW_DAYS)
}

/// Classifies a deadline with the default seven-day window.
///
/// An item's start date never affects the bucket, so it is not a parameter.
pub fn classify_deadline(
    now: DateTime<Utc>,
    deadline: DateTime<Utc>,
    status: ProjectStatus,
) -> DeadlineBucket {
    classify_deadline_within(now, deadline, status, default_upcoming_window())
}

/// Classifies a deadline against an explicit upcoming window.
///
/// - `PastDeadline`: `deadline < now`, not completed.
/// - `UpcomingDeadline`: `now < deadline < now + window`, not completed.
/// - `Other`: everything else, including `deadline == now`.
pub fn classify_deadline_within(
    now: DateTime<Utc>,
    deadline: DateTime<Utc>,
    status: ProjectStatus,
    window: Duration,
) -> DeadlineBucket {
    if status == ProjectStatus::Completed {
        return DeadlineBucket::Other;
    }
    if deadline < now {
        return DeadlineBucket::PastDeadline;
    }
    let before_window_end = now
        .checked_add_signed(window)
        .map_or(true, |window_end| deadline < window_end);
    if deadline > now && before_window_end {
        return DeadlineBucket::UpcomingDeadline;
    }
    DeadlineBucket::Other
}

/// Classifies a project by its deadline and status; `start_date` is ignored.
pub fn classify_project(
    now: DateTime<Utc>,
    project: &Project,
    window: Duration,
) -> DeadlineBucket {
    classify_deadline_within(now, project.deadline, project.status, window)
}

/// Classifies an entry by its end date. Entries carry no status, so they
/// are never treated as completed.
pub fn classify_entry(now: DateTime<Utc>, entry: &Entry, window: Duration) -> DeadlineBucket {
    classify_deadline_within(now, entry.end_date, ProjectStatus::Ongoing, window)
}

#[cfg(test)]
mod tests {
    use super::{
        classify_deadline, classify_deadline_within, classify_project,
        default_upcoming_window, DeadlineBucket,
    };
    use crate::model::project::{Project, ProjectDraft, ProjectStatus};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn deadline_equal_to_now_is_other() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            classify_deadline(now, now, ProjectStatus::Ongoing),
            DeadlineBucket::Other
        );
    }

    #[test]
    fn window_upper_bound_is_exclusive() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let edge = now + Duration::days(7);
        assert_eq!(
            classify_deadline(now, edge, ProjectStatus::Ongoing),
            DeadlineBucket::Other
        );
        assert_eq!(
            classify_deadline(now, edge - Duration::seconds(1), ProjectStatus::OnHold),
            DeadlineBucket::UpcomingDeadline
        );
    }

    #[test]
    fn custom_window_changes_upcoming_range() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let deadline = now + Duration::days(10);
        assert_eq!(
            classify_deadline_within(now, deadline, ProjectStatus::Ongoing, Duration::days(14)),
            DeadlineBucket::UpcomingDeadline
        );
    }

    #[test]
    fn project_start_date_does_not_change_the_bucket() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        let deadline = now - Duration::days(1);
        let window = default_upcoming_window();

        let early = ProjectDraft::new("Survey", now - Duration::days(30), deadline);
        let late = ProjectDraft::new("Survey", now + Duration::days(30), deadline);
        let early = Project::from_draft("p1", early);
        let late = Project::from_draft("p2", late);

        assert_eq!(classify_project(now, &early, window), DeadlineBucket::PastDeadline);
        assert_eq!(classify_project(now, &late, window), DeadlineBucket::PastDeadline);
    }

    #[test]
    fn buckets_sort_in_display_order() {
        let mut buckets = vec![
            DeadlineBucket::Other,
            DeadlineBucket::PastDeadline,
            DeadlineBucket::UpcomingDeadline,
        ];
        buckets.sort();
        assert_eq!(
            buckets,
            vec![
                DeadlineBucket::PastDeadline,
                DeadlineBucket::UpcomingDeadline,
                DeadlineBucket::Other
            ]
        );
    }
}
