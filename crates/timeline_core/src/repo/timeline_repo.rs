//! In-memory timeline backed by a table store with local fallback.
//!
//! # Responsibility
//! - Own the entries collection (each entry owning its projects).
//! - Run every write as remote-first, then apply it locally regardless of
//!   the remote outcome.
//! - Substitute the seed dataset when the initial load fails.
//!
//! # Invariants
//! - Validation, lookup and permission checks run before any store call and
//!   leave state untouched on failure.
//! - After a write returns `Ok`, local state reflects the caller's intent.
//! - Entries are ordered by `start_date` ascending after each creation.
//! - A snapshot fetched before a local mutation is never applied.

use crate::directory::default_division_for;
use crate::model::entry::{Entry, EntryDraft, EntryPatch};
use crate::model::project::{Project, ProjectDraft, ProjectFieldKind, ProjectPatch};
use crate::model::user::{Role, User};
use crate::policy::{can_mutate, visible_entries};
use crate::repo::error::{RecordKind, TrackerError, TrackerResult};
use crate::repo::notify::{Notification, NotificationKind, NotificationSink};
use crate::repo::seed::seed_entries;
use crate::schedule::default_upcoming_window;
use crate::store::convert::{
    assemble_entries, entry_from_row, entry_patch_row, entry_values, project_from_row,
    project_patch_row, project_values,
};
use crate::store::{StoreResult, TableStore};
use crate::view::{
    bucket_projects, entries_on, group_entries_by_month, month_grid, CalendarDay, MonthGroup,
    ProjectBuckets,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{error, info, warn};

/// How the remote half of a write ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Synced,
    /// The store failed; the change exists in local state only.
    LocalOnly(TrackerError),
}

impl RemoteOutcome {
    /// Success or warning notification for a finished write.
    pub(crate) fn notification(&self, success: &str, failure: &str) -> Notification {
        match self {
            Self::Synced => Notification::new(NotificationKind::Success, success, ""),
            Self::LocalOnly(err) => {
                Notification::new(NotificationKind::Warning, failure, err.to_string())
            }
        }
    }
}

/// Result of a write that completed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome<T> {
    pub value: T,
    pub remote: RemoteOutcome,
}

impl<T> WriteOutcome<T> {
    pub fn is_synced(&self) -> bool {
        self.remote == RemoteOutcome::Synced
    }

    /// The non-fatal remote failure, if any.
    pub fn warning(&self) -> Option<&TrackerError> {
        match &self.remote {
            RemoteOutcome::Synced => None,
            RemoteOutcome::LocalOnly(err) => Some(err),
        }
    }
}

/// Entries read from the store, tagged with the generation they were read at.
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    result: TrackerResult<Vec<Entry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { entries: usize },
    /// The store failed; the seed dataset is shown instead.
    Seeded { error: TrackerError },
    /// A local mutation happened after the fetch; nothing was applied.
    Stale,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Stale)
    }

    pub fn error(&self) -> Option<&TrackerError> {
        match self {
            Self::Seeded { error } => Some(error),
            _ => None,
        }
    }
}

pub struct TimelineRepository<S, N> {
    store: S,
    sink: N,
    entries: Vec<Entry>,
    generation: u64,
    load_error: Option<TrackerError>,
    upcoming_window: Duration,
}

impl<S: TableStore, N: NotificationSink> TimelineRepository<S, N> {
    /// Creates an empty repository; call [`Self::load_all`] to populate it.
    pub fn new(store: S, sink: N) -> Self {
        Self {
            store,
            sink,
            entries: Vec::new(),
            generation: 0,
            load_error: None,
            upcoming_window: default_upcoming_window(),
        }
    }

    pub fn with_upcoming_window(mut self, window: Duration) -> Self {
        self.upcoming_window = window;
        self
    }

    pub fn upcoming_window(&self) -> Duration {
        self.upcoming_window
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Looks a project up by id, together with its owning entry.
    pub fn project(&self, project_id: &str) -> Option<(&Entry, &Project)> {
        self.entries.iter().find_map(|entry| {
            entry
                .projects
                .iter()
                .find(|project| project.id == project_id)
                .map(|project| (entry, project))
        })
    }

    /// Error of the most recent applied load, if it fell back to seed data.
    pub fn load_error(&self) -> Option<&TrackerError> {
        self.load_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reads both tables at the current generation without touching state.
    pub fn fetch_snapshot(&self) -> Snapshot {
        let result = self.read_all().map_err(TrackerError::from);
        Snapshot {
            generation: self.generation,
            result,
        }
    }

    /// Replaces local state with a snapshot unless it is stale.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> LoadOutcome {
        if snapshot.generation != self.generation {
            info!(
                "event=entries_load module=repo status=stale fetched_generation={} current_generation={}",
                snapshot.generation, self.generation
            );
            return LoadOutcome::Stale;
        }

        self.generation += 1;
        match snapshot.result {
            Ok(entries) => {
                let count = entries.len();
                self.entries = entries;
                self.load_error = None;
                info!("event=entries_load module=repo status=ok entries={count}");
                LoadOutcome::Loaded { entries: count }
            }
            Err(err) => {
                error!("event=entries_load module=repo status=seeded error={err}");
                self.entries = seed_entries();
                self.load_error = Some(err.clone());
                self.sink.notify(Notification::new(
                    NotificationKind::Error,
                    "Error fetching entries",
                    err.to_string(),
                ));
                LoadOutcome::Seeded { error: err }
            }
        }
    }

    /// Fetches and applies in one step.
    pub fn load_all(&mut self) -> LoadOutcome {
        let snapshot = self.fetch_snapshot();
        self.apply_snapshot(snapshot)
    }

    /// Fails only when the store does; undecodable rows are skipped.
    fn read_all(&self) -> StoreResult<Vec<Entry>> {
        let entry_rows = self.store.select_entries()?;
        let project_rows = self.store.select_projects()?;
        Ok(assemble_entries(entry_rows, project_rows))
    }

    /// Creates an entry owned by the caller's department (heads) or the
    /// draft's department (admins).
    ///
    /// # Errors
    /// - `PermissionDenied` for anonymous callers.
    /// - `ValidationFailed` for an empty title or a bad department/division.
    pub fn create_entry(
        &mut self,
        caller: Option<&User>,
        draft: EntryDraft,
    ) -> TrackerResult<WriteOutcome<Entry>> {
        let mut draft = draft.normalized();
        let (department_id, division_id) =
            creation_assignment(caller, draft.department_id.take(), draft.division_id.take());
        draft.department_id = department_id;
        draft.division_id = division_id;

        if !can_mutate(caller, draft.department_id.as_deref()) {
            return Err(TrackerError::PermissionDenied);
        }
        draft.validate()?;

        let remote = self
            .store
            .insert_entry(&entry_values(&draft))
            .and_then(entry_from_row);
        let (entry, remote) = match remote {
            Ok(entry) => (entry, RemoteOutcome::Synced),
            Err(err) => {
                let err = TrackerError::from(err);
                let entry = Entry::from_draft(self.mint_local_id(), draft);
                warn!(
                    "event=entry_create module=repo status=fallback entry_id={} error={err}",
                    entry.id
                );
                (entry, RemoteOutcome::LocalOnly(err))
            }
        };

        self.entries.push(entry.clone());
        self.entries.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        self.generation += 1;
        self.report(&remote, "Entry Added", "Error Adding Entry");
        if remote == RemoteOutcome::Synced {
            info!("event=entry_create module=repo status=ok entry_id={}", entry.id);
        }
        Ok(WriteOutcome {
            value: entry,
            remote,
        })
    }

    /// Creates a project under `entry_id`; permission follows the entry's department.
    pub fn create_project(
        &mut self,
        caller: Option<&User>,
        entry_id: &str,
        draft: ProjectDraft,
    ) -> TrackerResult<WriteOutcome<Project>> {
        let index = self.entry_index(entry_id)?;
        if !can_mutate(caller, self.entries[index].department_id.as_deref()) {
            return Err(TrackerError::PermissionDenied);
        }

        let mut draft = draft.normalized();
        let (department_id, division_id) =
            creation_assignment(caller, draft.department_id.take(), draft.division_id.take());
        draft.department_id = department_id;
        draft.division_id = division_id;
        draft.validate()?;

        let remote = self
            .store
            .insert_project(&project_values(entry_id, &draft))
            .and_then(project_from_row);
        let (project, remote) = match remote {
            Ok((_, project)) => (project, RemoteOutcome::Synced),
            Err(err) => {
                let err = TrackerError::from(err);
                let project = Project::from_draft(self.mint_local_id(), draft);
                warn!(
                    "event=project_create module=repo status=fallback entry_id={entry_id} project_id={} error={err}",
                    project.id
                );
                (project, RemoteOutcome::LocalOnly(err))
            }
        };

        self.entries[index].projects.push(project.clone());
        self.generation += 1;
        self.report(&remote, "Project Added", "Error Adding Project");
        if remote == RemoteOutcome::Synced {
            info!(
                "event=project_create module=repo status=ok entry_id={entry_id} project_id={}",
                project.id
            );
        }
        Ok(WriteOutcome {
            value: project,
            remote,
        })
    }

    /// Applies a partial update; the store receives the effective patch
    /// (including any clamped date bound).
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    /// - `PermissionDenied` if the caller may not modify the entry before or
    ///   after the change.
    /// - `ValidationFailed` if the patched entry is invalid.
    pub fn update_entry(
        &mut self,
        caller: Option<&User>,
        id: &str,
        patch: &EntryPatch,
    ) -> TrackerResult<WriteOutcome<Entry>> {
        let index = self.entry_index(id)?;
        if !can_mutate(caller, self.entries[index].department_id.as_deref()) {
            return Err(TrackerError::PermissionDenied);
        }

        let mut updated = self.entries[index].clone();
        let effective = updated.apply_patch(patch);
        updated.validate()?;
        if !can_mutate(caller, updated.department_id.as_deref()) {
            return Err(TrackerError::PermissionDenied);
        }

        let remote = if effective.is_empty() {
            RemoteOutcome::Synced
        } else {
            match self.store.update_entry(id, &entry_patch_row(&effective)) {
                Ok(()) => RemoteOutcome::Synced,
                Err(err) => {
                    let err = TrackerError::from(err);
                    warn!(
                        "event=entry_update module=repo status=fallback entry_id={id} error={err}"
                    );
                    RemoteOutcome::LocalOnly(err)
                }
            }
        };

        self.entries[index] = updated.clone();
        self.generation += 1;
        self.report(&remote, "Entry Updated", "Error Updating Entry");
        Ok(WriteOutcome {
            value: updated,
            remote,
        })
    }

    /// Applies a partial update to a project located by id.
    ///
    /// Permission follows the parent entry's department; a patch that moves
    /// the project to another department must also be permitted there.
    pub fn update_project(
        &mut self,
        caller: Option<&User>,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> TrackerResult<WriteOutcome<Project>> {
        let (entry_index, project_index) = self.project_index(project_id)?;
        let entry = &self.entries[entry_index];
        if !can_mutate(caller, entry.department_id.as_deref()) {
            return Err(TrackerError::PermissionDenied);
        }

        let mut updated = entry.projects[project_index].clone();
        let effective = updated.apply_patch(patch);
        updated.validate()?;
        if patch.touches(ProjectFieldKind::DepartmentId)
            && !can_mutate(caller, updated.department_id.as_deref())
        {
            return Err(TrackerError::PermissionDenied);
        }

        let remote = if effective.is_empty() {
            RemoteOutcome::Synced
        } else {
            match self
                .store
                .update_project(project_id, &project_patch_row(&effective))
            {
                Ok(()) => RemoteOutcome::Synced,
                Err(err) => {
                    let err = TrackerError::from(err);
                    warn!(
                        "event=project_update module=repo status=fallback project_id={project_id} error={err}"
                    );
                    RemoteOutcome::LocalOnly(err)
                }
            }
        };

        self.entries[entry_index].projects[project_index] = updated.clone();
        self.generation += 1;
        self.report(&remote, "Project Updated", "Error Updating Project");
        Ok(WriteOutcome {
            value: updated,
            remote,
        })
    }

    /// Deletes an entry and all of its projects.
    ///
    /// Remotely the projects go first; the entry row is only deleted if that
    /// succeeded. Locally both are always removed.
    pub fn delete_entry(
        &mut self,
        caller: Option<&User>,
        id: &str,
    ) -> TrackerResult<WriteOutcome<Entry>> {
        let index = self.entry_index(id)?;
        if !can_mutate(caller, self.entries[index].department_id.as_deref()) {
            return Err(TrackerError::PermissionDenied);
        }

        let remote = match self
            .store
            .delete_projects_of_entry(id)
            .and_then(|()| self.store.delete_entry(id))
        {
            Ok(()) => RemoteOutcome::Synced,
            Err(err) => {
                let err = TrackerError::from(err);
                warn!("event=entry_delete module=repo status=fallback entry_id={id} error={err}");
                RemoteOutcome::LocalOnly(err)
            }
        };

        let removed = self.entries.remove(index);
        self.generation += 1;
        self.report(&remote, "Entry Deleted", "Error Deleting Entry");
        info!(
            "event=entry_delete module=repo status=done entry_id={id} projects_removed={}",
            removed.projects.len()
        );
        Ok(WriteOutcome {
            value: removed,
            remote,
        })
    }

    pub fn delete_project(
        &mut self,
        caller: Option<&User>,
        project_id: &str,
    ) -> TrackerResult<WriteOutcome<Project>> {
        let (entry_index, project_index) = self.project_index(project_id)?;
        if !can_mutate(caller, self.entries[entry_index].department_id.as_deref()) {
            return Err(TrackerError::PermissionDenied);
        }

        let remote = match self.store.delete_project(project_id) {
            Ok(()) => RemoteOutcome::Synced,
            Err(err) => {
                let err = TrackerError::from(err);
                warn!(
                    "event=project_delete module=repo status=fallback project_id={project_id} error={err}"
                );
                RemoteOutcome::LocalOnly(err)
            }
        };

        let removed = self.entries[entry_index].projects.remove(project_index);
        self.generation += 1;
        self.report(&remote, "Project Deleted", "Error Deleting Project");
        Ok(WriteOutcome {
            value: removed,
            remote,
        })
    }

    /// Entries the viewer may read, in collection order.
    pub fn visible_entries(&self, viewer: Option<&User>) -> Vec<&Entry> {
        visible_entries(viewer, &self.entries)
    }

    /// Month groups of visible entries, most recent month first.
    pub fn timeline(&self, viewer: Option<&User>) -> Vec<MonthGroup<'_>> {
        group_entries_by_month(self.visible_entries(viewer))
    }

    /// Urgency buckets of one visible entry's projects.
    pub fn project_buckets(
        &self,
        viewer: Option<&User>,
        entry_id: &str,
        now: DateTime<Utc>,
    ) -> TrackerResult<ProjectBuckets<'_>> {
        let entry = self
            .visible_entries(viewer)
            .into_iter()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| TrackerError::not_found(RecordKind::Entry, entry_id))?;
        Ok(bucket_projects(now, &entry.projects, self.upcoming_window))
    }

    pub fn entries_on(&self, viewer: Option<&User>, date: NaiveDate) -> Vec<&Entry> {
        entries_on(self.visible_entries(viewer), date)
    }

    /// Sunday-first calendar grid for a month; `None` for an invalid month.
    pub fn month_grid(
        &self,
        viewer: Option<&User>,
        year: i32,
        month: u32,
    ) -> Option<Vec<CalendarDay>> {
        month_grid(self.visible_entries(viewer), year, month)
    }

    fn entry_index(&self, id: &str) -> TrackerResult<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| TrackerError::not_found(RecordKind::Entry, id))
    }

    fn project_index(&self, project_id: &str) -> TrackerResult<(usize, usize)> {
        self.entries
            .iter()
            .enumerate()
            .find_map(|(entry_index, entry)| {
                entry
                    .projects
                    .iter()
                    .position(|project| project.id == project_id)
                    .map(|project_index| (entry_index, project_index))
            })
            .ok_or_else(|| TrackerError::not_found(RecordKind::Project, project_id))
    }

    /// Current-time millisecond id, bumped until unused by any entry or project.
    fn mint_local_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        loop {
            let id = candidate.to_string();
            let taken = self.entries.iter().any(|entry| {
                entry.id == id || entry.projects.iter().any(|project| project.id == id)
            });
            if !taken {
                return id;
            }
            candidate = candidate.saturating_add(1);
        }
    }

    fn report(&self, remote: &RemoteOutcome, success: &str, failure: &str) {
        self.sink.notify(remote.notification(success, failure));
    }
}

/// Department/division a new record gets for this caller.
///
/// Heads always create within their own department. A missing division
/// falls back to the department's default.
fn creation_assignment(
    caller: Option<&User>,
    department_id: Option<String>,
    division_id: Option<String>,
) -> (Option<String>, Option<String>) {
    let department_id = match caller {
        Some(user) if user.role == Role::HeadDepartment => user.department_id.clone(),
        _ => department_id,
    };
    let division_id = division_id.or_else(|| {
        department_id
            .as_deref()
            .and_then(default_division_for)
            .map(str::to_string)
    });
    (department_id, division_id)
}
