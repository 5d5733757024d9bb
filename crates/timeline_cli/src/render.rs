//! Plain-text rendering of timeline views.

use chrono::{Datelike, DateTime, Duration, Utc};
use timeline_core::directory::{department_name, division_name, Department};
use timeline_core::schedule::{classify_entry, DeadlineBucket};
use timeline_core::view::{CalendarDay, MonthGroup, ProjectBuckets};
use timeline_core::{Entry, Project, TrackerError, User, WriteOutcome};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn entry_line(entry: &Entry) -> String {
    let owner = match (entry.department_id.as_deref(), entry.division_id.as_deref()) {
        (Some(department), Some(division)) => format!(
            " [{} / {}]",
            department_name(department),
            division_name(department, division)
        ),
        (Some(department), None) => format!(" [{}]", department_name(department)),
        _ => String::new(),
    };
    format!(
        "{}  {} .. {}  {}  (hmif {}, dept {}, {}){owner}",
        entry.id,
        entry.start_date.format(DATE_FORMAT),
        entry.end_date.format(DATE_FORMAT),
        entry.title,
        entry.hmif_priority.as_str(),
        entry.department_priority.as_str(),
        entry.visibility.as_str(),
    )
}

pub fn project_line(project: &Project) -> String {
    let reason = project
        .on_hold_reason
        .as_deref()
        .map(|reason| format!(" ({reason})"))
        .unwrap_or_default();
    format!(
        "{}  due {}  {}  [{}{reason}]",
        project.id,
        project.deadline.format(DATE_FORMAT),
        project.title,
        project.status.as_str(),
    )
}

/// Month groups; entries ending soon or already ended are tagged.
pub fn timeline(groups: &[MonthGroup<'_>], now: DateTime<Utc>, window: Duration) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("== {} ==", group.key.label()));
        for entry in &group.entries {
            let line = match classify_entry(now, entry, window) {
                DeadlineBucket::Other => entry_line(entry),
                bucket => format!("{}  <{}>", entry_line(entry), bucket.label()),
            };
            lines.push(format!("  {line}"));
        }
    }
    if lines.is_empty() {
        lines.push("no entries".to_string());
    }
    lines
}

pub fn buckets(buckets: &ProjectBuckets<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for (bucket, projects) in buckets.in_display_order() {
        if projects.is_empty() {
            continue;
        }
        lines.push(format!("{}:", bucket.label()));
        lines.extend(projects.iter().map(|project| format!("  {}", project_line(project))));
    }
    if lines.is_empty() {
        lines.push("no projects".to_string());
    }
    lines
}

/// Seven columns, Sunday first; `*` marks days with entries, dots pad other months.
pub fn month_grid(days: &[CalendarDay]) -> Vec<String> {
    let mut lines = vec![" Su  Mo  Tu  We  Th  Fr  Sa".to_string()];
    for week in days.chunks(7) {
        let cells: Vec<String> = week
            .iter()
            .map(|day| {
                if !day.in_month {
                    return "  . ".to_string();
                }
                let marker = if day.has_entries { '*' } else { ' ' };
                format!("{:>3}{marker}", day.date.day())
            })
            .collect();
        lines.push(cells.concat());
    }
    lines
}

pub fn user_line(user: &User) -> String {
    let department = user
        .department_id
        .as_deref()
        .map(|id| format!(" [{}]", department_name(id)))
        .unwrap_or_default();
    format!(
        "{}  {}  {}{department}",
        user.id,
        user.username,
        user.role.as_str()
    )
}

pub fn departments(departments: &[Department]) -> Vec<String> {
    let mut lines = Vec::new();
    for department in departments {
        lines.push(format!("{}  {}", department.id, department.name));
        lines.extend(
            department
                .divisions
                .iter()
                .map(|division| format!("  {}  {}", division.id, division.name)),
        );
    }
    lines
}

/// Confirmation line plus a warning when the store did not take the write.
pub fn write_outcome<T>(outcome: &WriteOutcome<T>, done: &str) -> Vec<String> {
    let mut lines = vec![done.to_string()];
    if let Some(err) = outcome.warning() {
        lines.push(local_only_warning(err));
    }
    lines
}

fn local_only_warning(err: &TrackerError) -> String {
    format!("warning: kept locally only, the store did not accept the change: {err}")
}
