use chrono::{DateTime, TimeZone, Utc};
use timeline_core::db::open_db_in_memory;
use timeline_core::model::entry::EntryFieldKind;
use timeline_core::model::project::ProjectFieldKind;
use timeline_core::repo::CollectingSink;
use timeline_core::store::TableStore;
use timeline_core::{
    Entry, EntryDraft, EntryField, EntryPatch, Project, ProjectDraft, ProjectField, ProjectPatch,
    ProjectStatus, SqliteTableStore, TimelineRepository, User,
};

fn day(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
}

#[test]
fn draft_with_end_before_start_is_raised_to_start() {
    let entry = Entry::from_draft("1", EntryDraft::new("Offsite", day(5, 10), day(5, 5)));
    assert_eq!(entry.start_date, day(5, 10));
    assert_eq!(entry.end_date, day(5, 10));
}

#[test]
fn edited_bound_wins_and_drags_the_other() {
    let mut entry = Entry::from_draft("1", EntryDraft::new("Research", day(5, 10), day(5, 15)));

    let effective = entry.apply_patch(&EntryPatch::new().with(EntryField::EndDate(day(5, 2))));
    assert_eq!((entry.start_date, entry.end_date), (day(5, 2), day(5, 2)));
    assert_eq!(
        effective.get(EntryFieldKind::StartDate),
        Some(&EntryField::StartDate(day(5, 2)))
    );

    entry.apply_patch(&EntryPatch::new().with(EntryField::StartDate(day(5, 20))));
    assert_eq!((entry.start_date, entry.end_date), (day(5, 20), day(5, 20)));
}

#[test]
fn later_field_in_one_patch_wins() {
    let mut entry = Entry::from_draft("1", EntryDraft::new("Research", day(5, 10), day(5, 15)));
    let patch = EntryPatch::new()
        .with(EntryField::EndDate(day(5, 1)))
        .with(EntryField::StartDate(day(5, 12)));

    entry.apply_patch(&patch);
    assert_eq!(entry.start_date, day(5, 12));
    assert_eq!(entry.end_date, day(5, 12));
    assert!(entry.end_date >= entry.start_date);
}

#[test]
fn leaving_on_hold_clears_the_reason() {
    let mut draft = ProjectDraft::new("Market Analysis", day(5, 10), day(5, 12));
    draft.status = ProjectStatus::OnHold;
    draft.on_hold_reason = Some("Waiting for data".to_string());
    let mut project = Project::from_draft("p3", draft);
    assert_eq!(project.on_hold_reason.as_deref(), Some("Waiting for data"));

    let patch = ProjectPatch::new().with(ProjectField::Status(ProjectStatus::Ongoing));
    let effective = project.apply_patch(&patch);
    assert_eq!(project.on_hold_reason, None);
    assert_eq!(
        effective.get(ProjectFieldKind::OnHoldReason),
        Some(&ProjectField::OnHoldReason(None))
    );
}

#[test]
fn reason_is_dropped_unless_project_is_on_hold() {
    let mut draft = ProjectDraft::new("Team Assignment", day(5, 1), day(5, 3));
    draft.on_hold_reason = Some("stray".to_string());
    assert_eq!(Project::from_draft("p2", draft).on_hold_reason, None);
}

#[test]
fn project_deadline_follows_the_same_clamp() {
    let mut project =
        Project::from_draft("p1", ProjectDraft::new("Gathering", day(5, 1), day(5, 5)));
    project.apply_patch(&ProjectPatch::new().with(ProjectField::StartDate(day(5, 9))));
    assert_eq!(project.deadline, day(5, 9));
}

#[test]
fn wire_shape_uses_camel_case_names() {
    let entry = Entry::from_draft("1", EntryDraft::new("Kickoff", day(5, 1), day(5, 1)));
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["personInCharge"], "");
    assert_eq!(json["hmifPriority"], "Mid");
    assert_eq!(json["visibility"], "Public");
    assert!(json.get("startDate").is_some());

    let project = Project::from_draft("p", ProjectDraft::new("Task", day(5, 1), day(5, 1)));
    let json = serde_json::to_value(&project).unwrap();
    assert_eq!(json["status"], "ongoing");
    assert!(json.get("onHoldReason").is_some());
}

#[test]
fn status_change_reaches_the_store_with_cleared_reason() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);
    let sink = CollectingSink::new();
    let mut repo = TimelineRepository::new(&store, &sink);
    let admin = User::admin("1", "admin", "admin123");

    let entry = repo
        .create_entry(Some(&admin), EntryDraft::new("Research", day(5, 10), day(5, 15)))
        .unwrap()
        .value;
    let mut draft = ProjectDraft::new("Market Analysis", day(5, 10), day(5, 12));
    draft.status = ProjectStatus::OnHold;
    draft.on_hold_reason = Some("Waiting for data".to_string());
    let project = repo
        .create_project(Some(&admin), &entry.id, draft)
        .unwrap()
        .value;

    let patch = ProjectPatch::new().with(ProjectField::Status(ProjectStatus::Completed));
    let outcome = repo.update_project(Some(&admin), &project.id, &patch).unwrap();
    assert!(outcome.is_synced());

    let row = store.select_projects().unwrap().remove(0);
    assert_eq!(row.id, project.id);
    assert_eq!(row.values.status, "completed");
    assert_eq!(row.values.on_hold_reason, None);
    assert_eq!(repo.project(&project.id).unwrap().1.on_hold_reason, None);
}

#[test]
fn clamped_bound_is_written_to_the_store() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);
    let sink = CollectingSink::new();
    let mut repo = TimelineRepository::new(&store, &sink);
    let admin = User::admin("1", "admin", "admin123");

    let entry = repo
        .create_entry(Some(&admin), EntryDraft::new("Research", day(5, 10), day(5, 15)))
        .unwrap()
        .value;
    let patch = EntryPatch::new().with(EntryField::StartDate(day(5, 20)));
    repo.update_entry(Some(&admin), &entry.id, &patch).unwrap();

    let row = store.select_entries().unwrap().remove(0);
    assert_eq!(row.values.start_date, "2024-05-20T00:00:00.000Z");
    assert_eq!(row.values.end_date, "2024-05-20T00:00:00.000Z");
}
