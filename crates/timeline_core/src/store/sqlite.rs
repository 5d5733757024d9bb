//! SQLite-backed table store.
//!
//! # Invariants
//! - Issued ids are UUID v4 strings.
//! - Partial updates only touch whitelisted columns of the target table.
//! - Rows are returned in insertion order.

use crate::store::{
    EntryRow, EntryValues, ProjectRow, ProjectValues, RowPatch, StoreError, StoreResult,
    TableStore, UserRow, UserValues,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    title,
    pic,
    description,
    start_date,
    end_date,
    hmif_priority,
    department_priority,
    visibility,
    department_id,
    division_id
FROM entries";

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    entry_id,
    title,
    pic,
    description,
    start_date,
    deadline,
    hmif_priority,
    department_priority,
    department_id,
    division_id,
    status,
    on_hold_reason
FROM projects";

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    password_hash,
    role,
    department_id
FROM users";

const ENTRY_COLUMNS: &[&str] = &[
    "title",
    "pic",
    "description",
    "start_date",
    "end_date",
    "hmif_priority",
    "department_priority",
    "visibility",
    "department_id",
    "division_id",
];

const PROJECT_COLUMNS: &[&str] = &[
    "title",
    "pic",
    "description",
    "start_date",
    "deadline",
    "hmif_priority",
    "department_priority",
    "department_id",
    "division_id",
    "status",
    "on_hold_reason",
];

/// Table store over a migrated SQLite connection (see [`crate::db::open_db`]).
pub struct SqliteTableStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTableStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn update_row(
        &self,
        table: &str,
        allowed: &[&str],
        id: &str,
        patch: &RowPatch,
    ) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut assignments = Vec::with_capacity(patch.columns().len());
        let mut bind_values: Vec<Value> = Vec::with_capacity(patch.columns().len() + 1);
        for (column, value) in patch.columns() {
            if !allowed.contains(column) {
                return Err(StoreError::Rejected(format!(
                    "unknown column `{column}` for {table}"
                )));
            }
            assignments.push(format!("{column} = ?"));
            bind_values.push(match value {
                Some(text) => Value::Text(text.clone()),
                None => Value::Null,
            });
        }
        bind_values.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE {table} SET {} WHERE id = ?;", assignments.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(StoreError::Rejected(format!("{table} row not found: {id}")));
        }
        Ok(())
    }
}

impl TableStore for SqliteTableStore<'_> {
    fn select_entries(&self) -> StoreResult<Vec<EntryRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let rows = stmt.query_map([], parse_entry_row)?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn select_projects(&self) -> StoreResult<Vec<ProjectRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let rows = stmt.query_map([], parse_project_row)?;
        let projects = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    fn insert_entry(&self, values: &EntryValues) -> StoreResult<EntryRow> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO entries (
                id,
                title,
                pic,
                description,
                start_date,
                end_date,
                hmif_priority,
                department_priority,
                visibility,
                department_id,
                division_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                id,
                values.title,
                values.pic,
                values.description,
                values.start_date,
                values.end_date,
                values.hmif_priority,
                values.department_priority,
                values.visibility,
                values.department_id,
                values.division_id,
            ],
        )?;

        let row = self.conn.query_row(
            &format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"),
            [id.as_str()],
            parse_entry_row,
        )?;
        Ok(row)
    }

    fn update_entry(&self, id: &str, patch: &RowPatch) -> StoreResult<()> {
        self.update_row("entries", ENTRY_COLUMNS, id, patch)
    }

    fn delete_entry(&self, id: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM entries WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn insert_project(&self, values: &ProjectValues) -> StoreResult<ProjectRow> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO projects (
                id,
                entry_id,
                title,
                pic,
                description,
                start_date,
                deadline,
                hmif_priority,
                department_priority,
                department_id,
                division_id,
                status,
                on_hold_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                id,
                values.entry_id,
                values.title,
                values.pic,
                values.description,
                values.start_date,
                values.deadline,
                values.hmif_priority,
                values.department_priority,
                values.department_id,
                values.division_id,
                values.status,
                values.on_hold_reason,
            ],
        )?;

        let row = self.conn.query_row(
            &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
            [id.as_str()],
            parse_project_row,
        )?;
        Ok(row)
    }

    fn update_project(&self, id: &str, patch: &RowPatch) -> StoreResult<()> {
        self.update_row("projects", PROJECT_COLUMNS, id, patch)
    }

    fn delete_project(&self, id: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn delete_projects_of_entry(&self, entry_id: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM projects WHERE entry_id = ?1;", [entry_id])?;
        Ok(())
    }

    fn select_users(&self) -> StoreResult<Vec<UserRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let rows = stmt.query_map([], parse_user_row)?;
        let users = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn insert_user(&self, values: &UserValues) -> StoreResult<UserRow> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO users (
                id,
                username,
                password_hash,
                role,
                department_id
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id,
                values.username,
                values.password_hash,
                values.role,
                values.department_id,
            ],
        )?;

        let row = self.conn.query_row(
            &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
            [id.as_str()],
            parse_user_row,
        )?;
        Ok(row)
    }
}

fn parse_entry_row(row: &Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok(EntryRow {
        id: row.get("id")?,
        values: EntryValues {
            title: row.get("title")?,
            pic: row.get("pic")?,
            description: row.get("description")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            hmif_priority: row.get("hmif_priority")?,
            department_priority: row.get("department_priority")?,
            visibility: row.get("visibility")?,
            department_id: row.get("department_id")?,
            division_id: row.get("division_id")?,
        },
    })
}

fn parse_project_row(row: &Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get("id")?,
        values: ProjectValues {
            entry_id: row.get("entry_id")?,
            title: row.get("title")?,
            pic: row.get("pic")?,
            description: row.get("description")?,
            start_date: row.get("start_date")?,
            deadline: row.get("deadline")?,
            hmif_priority: row.get("hmif_priority")?,
            department_priority: row.get("department_priority")?,
            department_id: row.get("department_id")?,
            division_id: row.get("division_id")?,
            status: row.get("status")?,
            on_hold_reason: row.get("on_hold_reason")?,
        },
    })
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get("id")?,
        values: UserValues {
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            role: row.get("role")?,
            department_id: row.get("department_id")?,
        },
    })
}
