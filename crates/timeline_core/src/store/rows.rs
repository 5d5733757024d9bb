use serde::{Deserialize, Serialize};

/// Column values of an `entries` row, without the store-issued id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryValues {
    pub title: String,
    pub pic: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub hmif_priority: String,
    pub department_priority: String,
    pub visibility: String,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: String,
    #[serde(flatten)]
    pub values: EntryValues,
}

/// Column values of a `projects` row, without the store-issued id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectValues {
    pub entry_id: String,
    pub title: String,
    pub pic: String,
    pub description: String,
    pub start_date: String,
    pub deadline: String,
    pub hmif_priority: String,
    pub department_priority: String,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub status: String,
    pub on_hold_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    #[serde(flatten)]
    pub values: ProjectValues,
}

/// Column values of a `users` row, without the store-issued id.
///
/// `password_hash` holds a PHC string; plaintext secrets never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserValues {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub department_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    #[serde(flatten)]
    pub values: UserValues,
}

/// Column assignments for a partial row update, in write order.
///
/// `None` writes SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowPatch {
    columns: Vec<(&'static str, Option<String>)>,
}

impl RowPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, replacing an earlier assignment of the same column.
    pub fn set(&mut self, column: &'static str, value: Option<String>) {
        self.columns.retain(|(existing, _)| *existing != column);
        self.columns.push((column, value));
    }

    pub fn columns(&self) -> &[(&'static str, Option<String>)] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.columns
            .iter()
            .find(|(existing, _)| *existing == column)
            .map(|(_, value)| value.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
