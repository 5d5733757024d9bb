use chrono::{TimeZone, Utc};
use timeline_core::db::open_db_in_memory;
use timeline_core::model::entry::EntryDraft;
use timeline_core::model::project::ProjectDraft;
use timeline_core::store::convert::{assemble_entries, entry_values, project_values};
use timeline_core::store::{RowPatch, UserValues};
use timeline_core::{ProjectStatus, SqliteTableStore, StoreError, TableStore, Visibility};

fn kickoff_draft() -> EntryDraft {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let mut draft = EntryDraft::new("Project Kickoff", start, start);
    draft.department_id = Some("kesekjenan".to_string());
    draft.division_id = Some("sekretaris".to_string());
    draft
}

#[test]
fn insert_issues_uuid_ids_and_select_returns_rows_in_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);

    let first = store.insert_entry(&entry_values(&kickoff_draft())).unwrap();
    let mut second_draft = kickoff_draft();
    second_draft.title = "Research Phase".to_string();
    let second = store.insert_entry(&entry_values(&second_draft)).unwrap();

    assert!(uuid::Uuid::parse_str(&first.id).is_ok());
    assert_ne!(first.id, second.id);
    assert_eq!(first.values.start_date, "2024-05-01T00:00:00.000Z");

    let rows = store.select_entries().unwrap();
    let titles: Vec<_> = rows.iter().map(|row| row.values.title.as_str()).collect();
    assert_eq!(titles, vec!["Project Kickoff", "Research Phase"]);
}

#[test]
fn partial_update_touches_only_patched_columns() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);
    let row = store.insert_entry(&entry_values(&kickoff_draft())).unwrap();

    let mut patch = RowPatch::new();
    patch.set("visibility", Some(Visibility::Private.as_str().to_string()));
    patch.set("division_id", None);
    store.update_entry(&row.id, &patch).unwrap();

    let stored = store.select_entries().unwrap().remove(0);
    assert_eq!(stored.values.visibility, "Private");
    assert_eq!(stored.values.division_id, None);
    assert_eq!(stored.values.title, "Project Kickoff");
    assert_eq!(stored.values.department_id.as_deref(), Some("kesekjenan"));
}

#[test]
fn updating_a_missing_row_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);

    let mut patch = RowPatch::new();
    patch.set("title", Some("Ghost".to_string()));
    let err = store.update_entry("missing", &patch).unwrap_err();
    assert!(matches!(err, StoreError::Rejected(_)));
}

#[test]
fn unknown_columns_are_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);
    let row = store.insert_entry(&entry_values(&kickoff_draft())).unwrap();

    let mut patch = RowPatch::new();
    patch.set("deadline", Some("2024-05-02T00:00:00.000Z".to_string()));
    assert!(matches!(
        store.update_entry(&row.id, &patch),
        Err(StoreError::Rejected(_))
    ));
}

#[test]
fn constraint_violations_map_to_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let orphan = ProjectDraft::new("Orphan", start, start);
    let err = store
        .insert_project(&project_values("no-such-entry", &orphan))
        .unwrap_err();
    assert!(matches!(err, StoreError::Rejected(_)));
}

#[test]
fn deleting_an_entry_cascades_to_its_projects() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);
    let entry = store.insert_entry(&entry_values(&kickoff_draft())).unwrap();

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let deadline = Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap();
    for title in ["Requirements Gathering", "Team Assignment"] {
        store
            .insert_project(&project_values(&entry.id, &ProjectDraft::new(title, start, deadline)))
            .unwrap();
    }
    assert_eq!(store.select_projects().unwrap().len(), 2);

    store.delete_entry(&entry.id).unwrap();
    assert!(store.select_entries().unwrap().is_empty());
    assert!(store.select_projects().unwrap().is_empty());

    store.delete_entry(&entry.id).unwrap();
}

#[test]
fn assembled_entries_carry_their_projects() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);
    let entry = store.insert_entry(&entry_values(&kickoff_draft())).unwrap();

    let start = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
    let deadline = Utc.with_ymd_and_hms(2024, 5, 12, 0, 0, 0).unwrap();
    let mut draft = ProjectDraft::new("Market Analysis", start, deadline);
    draft.status = ProjectStatus::OnHold;
    draft.on_hold_reason = Some("Waiting for additional market data".to_string());
    store
        .insert_project(&project_values(&entry.id, &draft.normalized()))
        .unwrap();

    let entries = assemble_entries(
        store.select_entries().unwrap(),
        store.select_projects().unwrap(),
    );

    assert_eq!(entries.len(), 1);
    let project = &entries[0].projects[0];
    assert_eq!(project.status, ProjectStatus::OnHold);
    assert_eq!(
        project.on_hold_reason.as_deref(),
        Some("Waiting for additional market data")
    );
    assert_eq!(project.deadline, deadline);
}

#[test]
fn users_round_trip_and_duplicate_usernames_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTableStore::new(&conn);
    let values = UserValues {
        username: "sdm_head".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        role: "head_department".to_string(),
        department_id: Some("sdm".to_string()),
    };

    let row = store.insert_user(&values).unwrap();
    assert!(uuid::Uuid::parse_str(&row.id).is_ok());
    assert_eq!(row.values, values);

    let duplicate = store.insert_user(&values).unwrap_err();
    assert!(matches!(duplicate, StoreError::Rejected(_)));

    let rows = store.select_users().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].values.password_hash.starts_with("$argon2id$"));
}
