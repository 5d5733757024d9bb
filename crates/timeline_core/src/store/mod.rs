//! Table-store boundary: the remote collaborator holding `entries`,
//! `projects` and `users` rows.
//!
//! # Responsibility
//! - Define the row-level contract the repository writes through.
//! - Translate between underscore_case rows and the camelCase domain model.
//! - Provide a SQLite implementation and an unconfigured stand-in.
//!
//! # Invariants
//! - Rows carry dates as RFC 3339 UTC strings; decoding never guesses.
//! - Store errors are classified as `Unavailable` (transport/config) or
//!   `Rejected` (the store refused the write); nothing else leaks upward
//!   except `InvalidRow` for undecodable data.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod convert;
mod rows;
mod sqlite;
mod unconfigured;

pub use rows::{EntryRow, EntryValues, ProjectRow, ProjectValues, RowPatch, UserRow, UserValues};
pub use sqlite::SqliteTableStore;
pub use unconfigured::UnconfiguredStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store unreachable or not configured.
    Unavailable(String),
    /// Store refused the operation (constraint violation, unknown row).
    Rejected(String),
    /// A stored row could not be decoded into the domain model.
    InvalidRow(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "table store unavailable: {message}"),
            Self::Rejected(message) => write!(f, "table store rejected the request: {message}"),
            Self::InvalidRow(message) => write!(f, "invalid stored row: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => Self::Rejected(value.to_string()),
            _ => Self::Unavailable(value.to_string()),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Row-level access to the logical tables.
///
/// Implementations are synchronous; callers treat every method as a remote
/// call that may fail.
pub trait TableStore {
    fn select_entries(&self) -> StoreResult<Vec<EntryRow>>;
    fn select_projects(&self) -> StoreResult<Vec<ProjectRow>>;

    /// Inserts a row and returns it as stored, including the issued id.
    fn insert_entry(&self, values: &EntryValues) -> StoreResult<EntryRow>;
    /// Writes only the columns present in `patch`; `Rejected` if no row matched.
    fn update_entry(&self, id: &str, patch: &RowPatch) -> StoreResult<()>;
    /// Deleting an absent row succeeds.
    fn delete_entry(&self, id: &str) -> StoreResult<()>;

    fn insert_project(&self, values: &ProjectValues) -> StoreResult<ProjectRow>;
    fn update_project(&self, id: &str, patch: &RowPatch) -> StoreResult<()>;
    fn delete_project(&self, id: &str) -> StoreResult<()>;
    fn delete_projects_of_entry(&self, entry_id: &str) -> StoreResult<()>;

    fn select_users(&self) -> StoreResult<Vec<UserRow>>;
    /// `Rejected` when the username is already taken.
    fn insert_user(&self, values: &UserValues) -> StoreResult<UserRow>;
}

impl<T: TableStore + ?Sized> TableStore for &T {
    fn select_entries(&self) -> StoreResult<Vec<EntryRow>> {
        (**self).select_entries()
    }

    fn select_projects(&self) -> StoreResult<Vec<ProjectRow>> {
        (**self).select_projects()
    }

    fn insert_entry(&self, values: &EntryValues) -> StoreResult<EntryRow> {
        (**self).insert_entry(values)
    }

    fn update_entry(&self, id: &str, patch: &RowPatch) -> StoreResult<()> {
        (**self).update_entry(id, patch)
    }

    fn delete_entry(&self, id: &str) -> StoreResult<()> {
        (**self).delete_entry(id)
    }

    fn insert_project(&self, values: &ProjectValues) -> StoreResult<ProjectRow> {
        (**self).insert_project(values)
    }

    fn update_project(&self, id: &str, patch: &RowPatch) -> StoreResult<()> {
        (**self).update_project(id, patch)
    }

    fn delete_project(&self, id: &str) -> StoreResult<()> {
        (**self).delete_project(id)
    }

    fn delete_projects_of_entry(&self, entry_id: &str) -> StoreResult<()> {
        (**self).delete_projects_of_entry(entry_id)
    }

    fn select_users(&self) -> StoreResult<Vec<UserRow>> {
        (**self).select_users()
    }

    fn insert_user(&self, values: &UserValues) -> StoreResult<UserRow> {
        (**self).insert_user(values)
    }
}
