use crate::store::{
    EntryRow, EntryValues, ProjectRow, ProjectValues, RowPatch, StoreError, StoreResult,
    TableStore, UserRow, UserValues,
};

/// Stand-in used when no store is configured; every call is `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredStore;

fn unavailable<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable(
        "table store is not configured".to_string(),
    ))
}

impl TableStore for UnconfiguredStore {
    fn select_entries(&self) -> StoreResult<Vec<EntryRow>> {
        unavailable()
    }

    fn select_projects(&self) -> StoreResult<Vec<ProjectRow>> {
        unavailable()
    }

    fn insert_entry(&self, _values: &EntryValues) -> StoreResult<EntryRow> {
        unavailable()
    }

    fn update_entry(&self, _id: &str, _patch: &RowPatch) -> StoreResult<()> {
        unavailable()
    }

    fn delete_entry(&self, _id: &str) -> StoreResult<()> {
        unavailable()
    }

    fn insert_project(&self, _values: &ProjectValues) -> StoreResult<ProjectRow> {
        unavailable()
    }

    fn update_project(&self, _id: &str, _patch: &RowPatch) -> StoreResult<()> {
        unavailable()
    }

    fn delete_project(&self, _id: &str) -> StoreResult<()> {
        unavailable()
    }

    fn delete_projects_of_entry(&self, _entry_id: &str) -> StoreResult<()> {
        unavailable()
    }

    fn select_users(&self) -> StoreResult<Vec<UserRow>> {
        unavailable()
    }

    fn insert_user(&self, _values: &UserValues) -> StoreResult<UserRow> {
        unavailable()
    }
}
