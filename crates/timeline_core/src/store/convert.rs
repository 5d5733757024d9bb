//! Field translation between store rows and domain records.
//!
//! # Invariants
//! - Instants are written as RFC 3339 UTC with millisecond precision.
//! - Decoding a single row with an unknown enum string or an unparseable
//!   date fails with `InvalidRow`.
//! - Bulk assembly skips undecodable rows; one bad row never hides the rest.
//! - Blank department/division ids are written as `NULL`.

use crate::model::entry::{Entry, EntryDraft, EntryField, EntryId, EntryPatch};
use crate::model::fields::{normalize_id, parse_priority, parse_visibility, Priority, Visibility};
use crate::model::project::{
    parse_project_status, Project, ProjectDraft, ProjectField, ProjectPatch,
};
use crate::model::user::{parse_role, User, UserDraft};
use crate::store::{
    EntryRow, EntryValues, ProjectRow, ProjectValues, RowPatch, StoreError, StoreResult, UserRow,
    UserValues,
};
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;

pub fn format_instant(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored instant; `column` names the source for the error message.
pub fn parse_instant(column: &str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidRow(format!("invalid date `{value}` in {column}")))
}

fn decode_priority(column: &str, value: &str) -> StoreResult<Priority> {
    parse_priority(value)
        .ok_or_else(|| StoreError::InvalidRow(format!("invalid priority `{value}` in {column}")))
}

fn decode_visibility(value: &str) -> StoreResult<Visibility> {
    parse_visibility(value).ok_or_else(|| {
        StoreError::InvalidRow(format!("invalid visibility `{value}` in entries.visibility"))
    })
}

/// Insert shape for a normalized entry draft.
pub fn entry_values(draft: &EntryDraft) -> EntryValues {
    EntryValues {
        title: draft.title.clone(),
        pic: draft.person_in_charge.clone(),
        description: draft.description.clone(),
        start_date: format_instant(draft.start_date),
        end_date: format_instant(draft.end_date),
        hmif_priority: draft.hmif_priority.as_str().to_string(),
        department_priority: draft.department_priority.as_str().to_string(),
        visibility: draft.visibility.as_str().to_string(),
        department_id: normalize_id(draft.department_id.clone()),
        division_id: normalize_id(draft.division_id.clone()),
    }
}

/// Insert shape for a normalized project draft under `entry_id`.
pub fn project_values(entry_id: &str, draft: &ProjectDraft) -> ProjectValues {
    ProjectValues {
        entry_id: entry_id.to_string(),
        title: draft.title.clone(),
        pic: draft.person_in_charge.clone(),
        description: draft.description.clone(),
        start_date: format_instant(draft.start_date),
        deadline: format_instant(draft.deadline),
        hmif_priority: draft.hmif_priority.as_str().to_string(),
        department_priority: draft.department_priority.as_str().to_string(),
        department_id: normalize_id(draft.department_id.clone()),
        division_id: normalize_id(draft.division_id.clone()),
        status: draft.status.as_str().to_string(),
        on_hold_reason: draft.on_hold_reason.clone(),
    }
}

/// Decodes an entry row; the result has no projects attached.
pub fn entry_from_row(row: EntryRow) -> StoreResult<Entry> {
    let values = row.values;
    Ok(Entry {
        start_date: parse_instant("entries.start_date", &values.start_date)?,
        end_date: parse_instant("entries.end_date", &values.end_date)?,
        hmif_priority: decode_priority("entries.hmif_priority", &values.hmif_priority)?,
        department_priority: decode_priority(
            "entries.department_priority",
            &values.department_priority,
        )?,
        visibility: decode_visibility(&values.visibility)?,
        id: row.id,
        title: values.title,
        person_in_charge: values.pic,
        description: values.description,
        department_id: normalize_id(values.department_id),
        division_id: normalize_id(values.division_id),
        projects: Vec::new(),
    })
}

/// Decodes a project row into its owning entry id and the project.
pub fn project_from_row(row: ProjectRow) -> StoreResult<(EntryId, Project)> {
    let values = row.values;
    let status = parse_project_status(&values.status).ok_or_else(|| {
        StoreError::InvalidRow(format!(
            "invalid status `{}` in projects.status",
            values.status
        ))
    })?;
    let project = Project {
        start_date: parse_instant("projects.start_date", &values.start_date)?,
        deadline: parse_instant("projects.deadline", &values.deadline)?,
        hmif_priority: decode_priority("projects.hmif_priority", &values.hmif_priority)?,
        department_priority: decode_priority(
            "projects.department_priority",
            &values.department_priority,
        )?,
        id: row.id,
        title: values.title,
        person_in_charge: values.pic,
        description: values.description,
        department_id: normalize_id(values.department_id),
        division_id: normalize_id(values.division_id),
        status,
        on_hold_reason: values.on_hold_reason,
    };
    Ok((values.entry_id, project))
}

/// Joins project rows onto their entries, keeping row order for both.
///
/// Rows that fail to decode are skipped with a warning, as are projects
/// whose entry is missing (or was skipped).
pub fn assemble_entries(entry_rows: Vec<EntryRow>, project_rows: Vec<ProjectRow>) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(entry_rows.len());
    for row in entry_rows {
        let id = row.id.clone();
        match entry_from_row(row) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(
                "event=store_assemble module=store status=invalid_row table=entries id={id} error={err}"
            ),
        }
    }

    for row in project_rows {
        let id = row.id.clone();
        let (entry_id, project) = match project_from_row(row) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(
                    "event=store_assemble module=store status=invalid_row table=projects id={id} error={err}"
                );
                continue;
            }
        };
        match entries.iter_mut().find(|entry| entry.id == entry_id) {
            Some(entry) => entry.projects.push(project),
            None => warn!(
                "event=store_assemble module=store status=orphan project_id={} entry_id={entry_id}",
                project.id
            ),
        }
    }
    entries
}

/// Insert shape for a user draft whose `secret` already holds the credential hash.
pub fn user_values(draft: &UserDraft) -> UserValues {
    UserValues {
        username: draft.username.clone(),
        password_hash: draft.secret.clone(),
        role: draft.role.as_str().to_string(),
        department_id: normalize_id(draft.department_id.clone()),
    }
}

pub fn user_from_row(row: UserRow) -> StoreResult<User> {
    let values = row.values;
    let role = parse_role(&values.role).ok_or_else(|| {
        StoreError::InvalidRow(format!("invalid role `{}` in users.role", values.role))
    })?;
    Ok(User {
        id: row.id,
        username: values.username,
        secret: values.password_hash,
        role,
        department_id: normalize_id(values.department_id),
    })
}

/// Decodes user rows, skipping the undecodable ones with a warning.
pub fn decode_users(rows: Vec<UserRow>) -> Vec<User> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            user_from_row(row)
                .map_err(|err| {
                    warn!(
                        "event=store_assemble module=store status=invalid_row table=users id={id} error={err}"
                    )
                })
                .ok()
        })
        .collect()
}

pub fn entry_patch_row(patch: &EntryPatch) -> RowPatch {
    let mut row = RowPatch::new();
    for field in patch.fields() {
        match field {
            EntryField::Title(value) => row.set("title", Some(value.clone())),
            EntryField::PersonInCharge(value) => row.set("pic", Some(value.clone())),
            EntryField::Description(value) => row.set("description", Some(value.clone())),
            EntryField::StartDate(value) => row.set("start_date", Some(format_instant(*value))),
            EntryField::EndDate(value) => row.set("end_date", Some(format_instant(*value))),
            EntryField::HmifPriority(value) => {
                row.set("hmif_priority", Some(value.as_str().to_string()))
            }
            EntryField::DepartmentPriority(value) => {
                row.set("department_priority", Some(value.as_str().to_string()))
            }
            EntryField::Visibility(value) => {
                row.set("visibility", Some(value.as_str().to_string()))
            }
            EntryField::DepartmentId(value) => {
                row.set("department_id", normalize_id(value.clone()))
            }
            EntryField::DivisionId(value) => row.set("division_id", normalize_id(value.clone())),
        }
    }
    row
}

pub fn project_patch_row(patch: &ProjectPatch) -> RowPatch {
    let mut row = RowPatch::new();
    for field in patch.fields() {
        match field {
            ProjectField::Title(value) => row.set("title", Some(value.clone())),
            ProjectField::PersonInCharge(value) => row.set("pic", Some(value.clone())),
            ProjectField::Description(value) => row.set("description", Some(value.clone())),
            ProjectField::StartDate(value) => row.set("start_date", Some(format_instant(*value))),
            ProjectField::Deadline(value) => row.set("deadline", Some(format_instant(*value))),
            ProjectField::HmifPriority(value) => {
                row.set("hmif_priority", Some(value.as_str().to_string()))
            }
            ProjectField::DepartmentPriority(value) => {
                row.set("department_priority", Some(value.as_str().to_string()))
            }
            ProjectField::DepartmentId(value) => {
                row.set("department_id", normalize_id(value.clone()))
            }
            ProjectField::DivisionId(value) => {
                row.set("division_id", normalize_id(value.clone()))
            }
            ProjectField::Status(value) => row.set("status", Some(value.as_str().to_string())),
            ProjectField::OnHoldReason(value) => row.set("on_hold_reason", value.clone()),
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::{
        assemble_entries, decode_users, entry_from_row, entry_patch_row, entry_values,
        format_instant, parse_instant, project_values, user_from_row,
    };
    use crate::model::entry::{EntryDraft, EntryField, EntryPatch};
    use crate::model::project::ProjectDraft;
    use crate::store::{EntryRow, ProjectRow, StoreError, UserRow, UserValues};
    use chrono::{TimeZone, Utc};

    #[test]
    fn instants_use_utc_millisecond_rfc3339() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(format_instant(instant), "2024-05-01T00:00:00.000Z");
        assert_eq!(
            parse_instant("entries.start_date", "2024-05-01T07:00:00+07:00").unwrap(),
            instant
        );
    }

    #[test]
    fn unparseable_date_is_an_invalid_row() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut values = entry_values(&EntryDraft::new("Kickoff", start, start));
        values.end_date = "not a date".to_string();

        let err = entry_from_row(EntryRow {
            id: "1".to_string(),
            values,
        })
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow(message) if message.contains("end_date")));
    }

    #[test]
    fn assembly_skips_undecodable_rows_and_keeps_the_rest() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let good = entry_values(&EntryDraft::new("Kickoff", start, start));
        let mut bad = good.clone();
        bad.hmif_priority = "Urgent".to_string();

        let mut project = project_values("good", &ProjectDraft::new("Gathering", start, start));
        let mut broken_project = project.clone();
        broken_project.deadline = "soon".to_string();
        project.title = "Budget".to_string();

        let entries = assemble_entries(
            vec![
                EntryRow {
                    id: "bad".to_string(),
                    values: bad,
                },
                EntryRow {
                    id: "good".to_string(),
                    values: good,
                },
            ],
            vec![
                ProjectRow {
                    id: "p-broken".to_string(),
                    values: broken_project,
                },
                ProjectRow {
                    id: "p-ok".to_string(),
                    values: project,
                },
            ],
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "good");
        let titles: Vec<_> = entries[0].projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Budget"]);
    }

    #[test]
    fn unknown_role_is_an_invalid_user_row() {
        let row = UserRow {
            id: "u1".to_string(),
            values: UserValues {
                username: "root".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role: "superuser".to_string(),
                department_id: None,
            },
        };
        assert!(matches!(
            user_from_row(row.clone()),
            Err(StoreError::InvalidRow(message)) if message.contains("users.role")
        ));
        assert!(decode_users(vec![row]).is_empty());
    }

    #[test]
    fn blank_division_patch_writes_null() {
        let patch = EntryPatch::new()
            .with(EntryField::PersonInCharge("Sarah".to_string()))
            .with(EntryField::DivisionId(Some(String::new())));
        let row = entry_patch_row(&patch);

        assert_eq!(row.get("pic"), Some(Some("Sarah")));
        assert_eq!(row.get("division_id"), Some(None));
        assert_eq!(row.get("title"), None);
    }
}
