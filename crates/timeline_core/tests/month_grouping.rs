use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use timeline_core::view::{
    entries_on, group_entries_by_month, has_entries_on, is_entry_active_on, month_grid, MonthKey,
};
use timeline_core::{Entry, EntryDraft};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

fn entry(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Entry {
    Entry::from_draft(id, EntryDraft::new(id, start, end))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn same_month_in_different_years_never_merges() {
    let entries = vec![
        entry("march-2024", at(2024, 3, 5), at(2024, 3, 5)),
        entry("march-2025", at(2025, 3, 5), at(2025, 3, 5)),
        entry("december-2024", at(2024, 12, 1), at(2024, 12, 1)),
    ];

    let groups = group_entries_by_month(&entries);
    let keys: Vec<_> = groups.iter().map(|group| group.key.to_string()).collect();
    assert_eq!(keys, vec!["2025-03", "2024-12", "2024-03"]);
    assert!(groups.iter().all(|group| group.entries.len() == 1));
}

#[test]
fn entries_within_a_month_sort_by_start_descending() {
    let entries = vec![
        entry("early", at(2024, 5, 1), at(2024, 5, 1)),
        entry("late", at(2024, 5, 20), at(2024, 5, 21)),
        entry("middle", at(2024, 5, 10), at(2024, 5, 15)),
    ];

    let groups = group_entries_by_month(&entries);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, MonthKey::new(2024, 5).unwrap());
    let ids: Vec<_> = groups[0].entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["late", "middle", "early"]);
}

#[test]
fn active_range_is_inclusive_by_day() {
    let research = entry("research", at(2024, 5, 10), at(2024, 5, 15));
    assert!(is_entry_active_on(&research, date(2024, 5, 10)));
    assert!(is_entry_active_on(&research, date(2024, 5, 15)));
    assert!(!is_entry_active_on(&research, date(2024, 5, 9)));
    assert!(!is_entry_active_on(&research, date(2024, 5, 16)));
}

#[test]
fn inverted_stored_range_never_matches() {
    let mut broken = entry("broken", at(2024, 5, 10), at(2024, 5, 10));
    broken.end_date = at(2024, 5, 1);
    assert!(!is_entry_active_on(&broken, date(2024, 5, 5)));
    assert!(!is_entry_active_on(&broken, date(2024, 5, 10)));
}

#[test]
fn day_queries_filter_by_membership() {
    let entries = vec![
        entry("kickoff", at(2024, 5, 1), at(2024, 5, 1)),
        entry("research", at(2024, 5, 10), at(2024, 5, 15)),
    ];
    let on_twelfth = entries_on(&entries, date(2024, 5, 12));
    assert_eq!(on_twelfth.len(), 1);
    assert_eq!(on_twelfth[0].id, "research");
    assert!(!has_entries_on(&entries, date(2024, 5, 2)));
}

#[test]
fn month_grid_spans_whole_weeks_from_sunday() {
    let entries = vec![entry("research", at(2024, 5, 10), at(2024, 5, 15))];

    // May 2024 starts on a Wednesday and ends on a Friday.
    let grid = month_grid(&entries, 2024, 5).unwrap();
    assert_eq!(grid.len(), 35);
    assert_eq!(grid[0].date, date(2024, 4, 28));
    assert_eq!(grid[34].date, date(2024, 6, 1));
    assert!(!grid[0].in_month);
    assert!(grid[3].in_month);

    let marked: Vec<_> = grid
        .iter()
        .filter(|day| day.has_entries)
        .map(|day| day.date)
        .collect();
    assert_eq!(marked.first(), Some(&date(2024, 5, 10)));
    assert_eq!(marked.len(), 6);

    assert!(month_grid(&entries, 2024, 13).is_none());
}
