//! Project domain model.
//!
//! # Responsibility
//! - Define the sub-task record owned by an entry.
//! - Keep status/on-hold-reason coupling and deadline clamping consistent.
//!
//! # Invariants
//! - `deadline >= start_date` after normalization and after every patch.
//! - `on_hold_reason` is `None` unless `status == ProjectStatus::OnHold`.
//! - New projects start as `ProjectStatus::Ongoing`.

use crate::directory::validate_assignment;
use crate::model::fields::{normalize_id, validate_title, Priority, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProjectId = String;

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Ongoing,
    OnHold,
    Canceled,
    Completed,
}

impl ProjectStatus {
    /// Stable string stored in `projects.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::OnHold => "on_hold",
            Self::Canceled => "canceled",
            Self::Completed => "completed",
        }
    }
}

pub fn parse_project_status(value: &str) -> Option<ProjectStatus> {
    match value {
        "ongoing" => Some(ProjectStatus::Ongoing),
        "on_hold" => Some(ProjectStatus::OnHold),
        "canceled" => Some(ProjectStatus::Canceled),
        "completed" => Some(ProjectStatus::Completed),
        _ => None,
    }
}

/// Sub-task of an entry with its own deadline and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub person_in_charge: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub hmif_priority: Priority,
    pub department_priority: Priority,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub status: ProjectStatus,
    /// Meaningful only while `status == OnHold`.
    pub on_hold_reason: Option<String>,
}

impl Project {
    pub fn from_draft(id: impl Into<ProjectId>, draft: ProjectDraft) -> Self {
        let draft = draft.normalized();
        Self {
            id: id.into(),
            title: draft.title,
            person_in_charge: draft.person_in_charge,
            description: draft.description,
            start_date: draft.start_date,
            deadline: draft.deadline,
            hmif_priority: draft.hmif_priority,
            department_priority: draft.department_priority,
            department_id: draft.department_id,
            division_id: draft.division_id,
            status: draft.status,
            on_hold_reason: draft.on_hold_reason,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_assignment(self.department_id.as_deref(), self.division_id.as_deref())
    }

    /// Applies a patch in field order and returns the effective patch.
    ///
    /// Same clamp rule as entries, with `deadline` as the upper bound.
    /// Leaving `OnHold` clears the reason; a reason set while the final
    /// status is not `OnHold` is dropped.
    pub fn apply_patch(&mut self, patch: &ProjectPatch) -> ProjectPatch {
        let mut effective = patch.clone();
        let mut range_touched = false;
        let reason_before = self.on_hold_reason.clone();

        for field in patch.fields() {
            match field {
                ProjectField::Title(value) => self.title = value.clone(),
                ProjectField::PersonInCharge(value) => self.person_in_charge = value.clone(),
                ProjectField::Description(value) => self.description = value.clone(),
                ProjectField::StartDate(value) => {
                    self.start_date = *value;
                    if self.deadline < *value {
                        self.deadline = *value;
                    }
                    range_touched = true;
                }
                ProjectField::Deadline(value) => {
                    self.deadline = *value;
                    if *value < self.start_date {
                        self.start_date = *value;
                    }
                    range_touched = true;
                }
                ProjectField::HmifPriority(value) => self.hmif_priority = *value,
                ProjectField::DepartmentPriority(value) => self.department_priority = *value,
                ProjectField::DepartmentId(value) => {
                    self.department_id = normalize_id(value.clone())
                }
                ProjectField::DivisionId(value) => self.division_id = normalize_id(value.clone()),
                ProjectField::Status(value) => self.status = *value,
                ProjectField::OnHoldReason(value) => self.on_hold_reason = value.clone(),
            }
        }

        if self.status != ProjectStatus::OnHold {
            self.on_hold_reason = None;
        }

        if range_touched {
            effective.set(ProjectField::StartDate(self.start_date));
            effective.set(ProjectField::Deadline(self.deadline));
        }
        if patch.touches(ProjectFieldKind::DepartmentId) {
            effective.set(ProjectField::DepartmentId(self.department_id.clone()));
        }
        if patch.touches(ProjectFieldKind::DivisionId) {
            effective.set(ProjectField::DivisionId(self.division_id.clone()));
        }
        if patch.touches(ProjectFieldKind::OnHoldReason) || reason_before != self.on_hold_reason {
            effective.set(ProjectField::OnHoldReason(self.on_hold_reason.clone()));
        }
        effective
    }
}

/// Creation input for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub person_in_charge: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub hmif_priority: Priority,
    pub department_priority: Priority,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub status: ProjectStatus,
    pub on_hold_reason: Option<String>,
}

impl ProjectDraft {
    pub fn new(
        title: impl Into<String>,
        start_date: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            person_in_charge: String::new(),
            description: String::new(),
            start_date,
            deadline,
            hmif_priority: Priority::default(),
            department_priority: Priority::default(),
            department_id: None,
            division_id: None,
            status: ProjectStatus::default(),
            on_hold_reason: None,
        }
    }

    /// Clamps the deadline, drops blank ids and stray on-hold reasons.
    pub fn normalized(mut self) -> Self {
        if self.deadline < self.start_date {
            self.deadline = self.start_date;
        }
        self.department_id = normalize_id(self.department_id);
        self.division_id = normalize_id(self.division_id);
        if self.status != ProjectStatus::OnHold {
            self.on_hold_reason = None;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_assignment(self.department_id.as_deref(), self.division_id.as_deref())
    }
}

/// One intended change to a project field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectField {
    Title(String),
    PersonInCharge(String),
    Description(String),
    StartDate(DateTime<Utc>),
    Deadline(DateTime<Utc>),
    HmifPriority(Priority),
    DepartmentPriority(Priority),
    DepartmentId(Option<String>),
    DivisionId(Option<String>),
    Status(ProjectStatus),
    OnHoldReason(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectFieldKind {
    Title,
    PersonInCharge,
    Description,
    StartDate,
    Deadline,
    HmifPriority,
    DepartmentPriority,
    DepartmentId,
    DivisionId,
    Status,
    OnHoldReason,
}

impl ProjectField {
    pub fn kind(&self) -> ProjectFieldKind {
        match self {
            Self::Title(_) => ProjectFieldKind::Title,
            Self::PersonInCharge(_) => ProjectFieldKind::PersonInCharge,
            Self::Description(_) => ProjectFieldKind::Description,
            Self::StartDate(_) => ProjectFieldKind::StartDate,
            Self::Deadline(_) => ProjectFieldKind::Deadline,
            Self::HmifPriority(_) => ProjectFieldKind::HmifPriority,
            Self::DepartmentPriority(_) => ProjectFieldKind::DepartmentPriority,
            Self::DepartmentId(_) => ProjectFieldKind::DepartmentId,
            Self::DivisionId(_) => ProjectFieldKind::DivisionId,
            Self::Status(_) => ProjectFieldKind::Status,
            Self::OnHoldReason(_) => ProjectFieldKind::OnHoldReason,
        }
    }
}

/// Partial update for a project; see [`crate::model::entry::EntryPatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    fields: Vec<ProjectField>,
}

impl ProjectPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: ProjectField) -> Self {
        self.set(field);
        self
    }

    pub fn set(&mut self, field: ProjectField) {
        let kind = field.kind();
        self.fields.retain(|existing| existing.kind() != kind);
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[ProjectField] {
        &self.fields
    }

    pub fn get(&self, kind: ProjectFieldKind) -> Option<&ProjectField> {
        self.fields.iter().find(|field| field.kind() == kind)
    }

    pub fn touches(&self, kind: ProjectFieldKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
