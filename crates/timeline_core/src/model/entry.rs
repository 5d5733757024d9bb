//! Entry domain model.
//!
//! # Responsibility
//! - Define the calendar entry record and its creation draft.
//! - Express partial updates as an explicit set of field assignments.
//! - Keep the date-range clamp rule in one place.
//!
//! # Invariants
//! - `end_date >= start_date` after normalization and after every patch.
//! - `division_id`, if set, belongs to `department_id`.
//! - An entry exclusively owns its `projects`.

use crate::directory::validate_assignment;
use crate::model::fields::{normalize_id, validate_title, Priority, ValidationError, Visibility};
use crate::model::project::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry identifier as issued by the table store, or minted locally.
pub type EntryId = String;

/// Calendar/timeline event with a date range and owned projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub person_in_charge: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub hmif_priority: Priority,
    pub department_priority: Priority,
    pub visibility: Visibility,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub projects: Vec<Project>,
}

impl Entry {
    /// Materializes a normalized draft under the given id with no projects.
    pub fn from_draft(id: impl Into<EntryId>, draft: EntryDraft) -> Self {
        let draft = draft.normalized();
        Self {
            id: id.into(),
            title: draft.title,
            person_in_charge: draft.person_in_charge,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            hmif_priority: draft.hmif_priority,
            department_priority: draft.department_priority,
            visibility: draft.visibility,
            department_id: draft.department_id,
            division_id: draft.division_id,
            projects: Vec::new(),
        }
    }

    /// Checks the invariants required before persisting this entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_assignment(self.department_id.as_deref(), self.division_id.as_deref())
    }

    /// Applies a patch in field order and returns the effective patch.
    ///
    /// The effective patch is what the store must receive: it includes the
    /// opposite date bound whenever the clamp rule moved it.
    ///
    /// # Clamp rule
    /// - Setting `StartDate` past the current end drags `end_date` along.
    /// - Setting `EndDate` before the current start drags `start_date` along.
    /// - Within one patch the later field wins.
    pub fn apply_patch(&mut self, patch: &EntryPatch) -> EntryPatch {
        let mut effective = patch.clone();
        let mut range_touched = false;

        for field in patch.fields() {
            match field {
                EntryField::Title(value) => self.title = value.clone(),
                EntryField::PersonInCharge(value) => self.person_in_charge = value.clone(),
                EntryField::Description(value) => self.description = value.clone(),
                EntryField::StartDate(value) => {
                    self.start_date = *value;
                    if self.end_date < *value {
                        self.end_date = *value;
                    }
                    range_touched = true;
                }
                EntryField::EndDate(value) => {
                    self.end_date = *value;
                    if *value < self.start_date {
                        self.start_date = *value;
                    }
                    range_touched = true;
                }
                EntryField::HmifPriority(value) => self.hmif_priority = *value,
                EntryField::DepartmentPriority(value) => self.department_priority = *value,
                EntryField::Visibility(value) => self.visibility = *value,
                EntryField::DepartmentId(value) => self.department_id = normalize_id(value.clone()),
                EntryField::DivisionId(value) => self.division_id = normalize_id(value.clone()),
            }
        }

        if range_touched {
            effective.set(EntryField::StartDate(self.start_date));
            effective.set(EntryField::EndDate(self.end_date));
        }
        if patch.touches(EntryFieldKind::DepartmentId) {
            effective.set(EntryField::DepartmentId(self.department_id.clone()));
        }
        if patch.touches(EntryFieldKind::DivisionId) {
            effective.set(EntryField::DivisionId(self.division_id.clone()));
        }
        effective
    }
}

/// Creation input for an entry. Defaults mirror a fresh dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub person_in_charge: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub hmif_priority: Priority,
    pub department_priority: Priority,
    pub visibility: Visibility,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
}

impl EntryDraft {
    /// Creates a draft with default priorities (`Mid`) and `Public` visibility.
    pub fn new(
        title: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            person_in_charge: String::new(),
            description: String::new(),
            start_date,
            end_date,
            hmif_priority: Priority::default(),
            department_priority: Priority::default(),
            visibility: Visibility::default(),
            department_id: None,
            division_id: None,
        }
    }

    /// Clamps `end_date` up to `start_date` and drops blank ids.
    pub fn normalized(mut self) -> Self {
        if self.end_date < self.start_date {
            self.end_date = self.start_date;
        }
        self.department_id = normalize_id(self.department_id);
        self.division_id = normalize_id(self.division_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_assignment(self.department_id.as_deref(), self.division_id.as_deref())
    }
}

/// One intended change to an entry field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryField {
    Title(String),
    PersonInCharge(String),
    Description(String),
    StartDate(DateTime<Utc>),
    EndDate(DateTime<Utc>),
    HmifPriority(Priority),
    DepartmentPriority(Priority),
    Visibility(Visibility),
    /// `None` clears the department.
    DepartmentId(Option<String>),
    /// `None` clears the division.
    DivisionId(Option<String>),
}

/// Discriminant of [`EntryField`], used for lookups within a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryFieldKind {
    Title,
    PersonInCharge,
    Description,
    StartDate,
    EndDate,
    HmifPriority,
    DepartmentPriority,
    Visibility,
    DepartmentId,
    DivisionId,
}

impl EntryField {
    pub fn kind(&self) -> EntryFieldKind {
        match self {
            Self::Title(_) => EntryFieldKind::Title,
            Self::PersonInCharge(_) => EntryFieldKind::PersonInCharge,
            Self::Description(_) => EntryFieldKind::Description,
            Self::StartDate(_) => EntryFieldKind::StartDate,
            Self::EndDate(_) => EntryFieldKind::EndDate,
            Self::HmifPriority(_) => EntryFieldKind::HmifPriority,
            Self::DepartmentPriority(_) => EntryFieldKind::DepartmentPriority,
            Self::Visibility(_) => EntryFieldKind::Visibility,
            Self::DepartmentId(_) => EntryFieldKind::DepartmentId,
            Self::DivisionId(_) => EntryFieldKind::DivisionId,
        }
    }
}

/// Partial update for an entry: each field kind appears at most once,
/// in the order it was last set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    fields: Vec<EntryField>,
}

impl EntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EntryPatch::set`].
    pub fn with(mut self, field: EntryField) -> Self {
        self.set(field);
        self
    }

    /// Adds a field, replacing an earlier value of the same kind.
    ///
    /// A replaced field moves to the end, so it counts as the latest edit.
    pub fn set(&mut self, field: EntryField) {
        let kind = field.kind();
        self.fields.retain(|existing| existing.kind() != kind);
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[EntryField] {
        &self.fields
    }

    pub fn get(&self, kind: EntryFieldKind) -> Option<&EntryField> {
        self.fields.iter().find(|field| field.kind() == kind)
    }

    pub fn touches(&self, kind: EntryFieldKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryDraft, EntryField, EntryFieldKind, EntryPatch};
    use chrono::{TimeZone, Utc};

    #[test]
    fn set_replaces_same_kind_and_moves_it_last() {
        let first = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let patch = EntryPatch::new()
            .with(EntryField::StartDate(first))
            .with(EntryField::Title("x".to_string()))
            .with(EntryField::StartDate(second));

        assert_eq!(patch.fields().len(), 2);
        assert_eq!(patch.fields()[1], EntryField::StartDate(second));
        assert!(patch.touches(EntryFieldKind::Title));
        assert!(!patch.touches(EntryFieldKind::EndDate));
    }

    #[test]
    fn blank_division_patch_clears_the_division() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut draft = EntryDraft::new("Kickoff", start, start);
        draft.department_id = Some("kesekjenan".to_string());
        draft.division_id = Some("sekretaris".to_string());
        let mut entry = Entry::from_draft("1", draft);

        let patch = EntryPatch::new().with(EntryField::DivisionId(Some(" ".to_string())));
        let effective = entry.apply_patch(&patch);

        assert_eq!(entry.division_id, None);
        assert_eq!(
            effective.get(EntryFieldKind::DivisionId),
            Some(&EntryField::DivisionId(None))
        );
    }
}
