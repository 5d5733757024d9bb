//! Users known to the tracker: the built-in accounts plus the `users` table.
//!
//! # Responsibility
//! - Resolve callers by username.
//! - Add users (admins only) through the same remote-then-local write path
//!   as entries and projects.
//!
//! # Invariants
//! - Usernames are unique within the directory.
//! - Built-in users stay available unless a stored user takes their username.
//! - Added users carry a hashed secret, both locally and in the store.

use crate::model::credential::hash_secret;
use crate::model::fields::ValidationError;
use crate::model::user::{User, UserDraft};
use crate::policy::can_manage_users;
use crate::repo::error::{TrackerError, TrackerResult};
use crate::repo::notify::NotificationSink;
use crate::repo::seed::seed_users;
use crate::repo::timeline_repo::{RemoteOutcome, WriteOutcome};
use crate::store::convert::{decode_users, user_from_row, user_values};
use crate::store::TableStore;
use chrono::Utc;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLoadOutcome {
    /// Stored users were merged over the built-in ones.
    Loaded { stored: usize },
    /// The store failed; the directory was left as it was.
    Unchanged { error: TrackerError },
}

pub struct UserDirectory<S, N> {
    store: S,
    sink: N,
    users: Vec<User>,
}

impl<S: TableStore, N: NotificationSink> UserDirectory<S, N> {
    /// Starts with the built-in users; call [`Self::load`] to add stored ones.
    pub fn new(store: S, sink: N) -> Self {
        Self {
            store,
            sink,
            users: seed_users(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|user| user.username == username)
    }

    pub fn load(&mut self) -> UserLoadOutcome {
        let rows = match self.store.select_users() {
            Ok(rows) => rows,
            Err(err) => {
                let error = TrackerError::from(err);
                warn!("event=users_load module=repo status=unchanged error={error}");
                return UserLoadOutcome::Unchanged { error };
            }
        };

        let stored = decode_users(rows);
        let count = stored.len();
        let mut users: Vec<User> = seed_users()
            .into_iter()
            .filter(|builtin| !stored.iter().any(|user| user.username == builtin.username))
            .collect();
        users.extend(stored);
        self.users = users;
        info!("event=users_load module=repo status=ok stored={count}");
        UserLoadOutcome::Loaded { stored: count }
    }

    /// Adds a user on behalf of an admin.
    ///
    /// # Errors
    /// - `PermissionDenied` unless the caller is an admin.
    /// - `ValidationFailed` for a bad username, an empty secret, a role and
    ///   department mismatch, or a username already in the directory.
    /// - `Credential` if the secret cannot be hashed.
    pub fn add_user(
        &mut self,
        caller: Option<&User>,
        draft: UserDraft,
    ) -> TrackerResult<WriteOutcome<User>> {
        if !can_manage_users(caller) {
            return Err(TrackerError::PermissionDenied);
        }
        let mut draft = draft.normalized();
        draft.validate()?;
        if self.user(&draft.username).is_some() {
            return Err(ValidationError::DuplicateUsername(draft.username).into());
        }
        draft.secret = hash_secret(&draft.secret)?;

        let remote = self
            .store
            .insert_user(&user_values(&draft))
            .and_then(user_from_row);
        let (user, remote) = match remote {
            Ok(user) => (user, RemoteOutcome::Synced),
            Err(err) => {
                let err = TrackerError::from(err);
                let user = draft.into_user(self.mint_local_id());
                warn!(
                    "event=user_add module=repo status=fallback user_id={} error={err}",
                    user.id
                );
                (user, RemoteOutcome::LocalOnly(err))
            }
        };

        self.users.push(user.clone());
        self.sink.notify(remote.notification("User Added", "Error Adding User"));
        if remote == RemoteOutcome::Synced {
            info!(
                "event=user_add module=repo status=ok user_id={} role={}",
                user.id,
                user.role.as_str()
            );
        }
        Ok(WriteOutcome {
            value: user,
            remote,
        })
    }

    fn mint_local_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        loop {
            let id = candidate.to_string();
            if !self.users.iter().any(|user| user.id == id) {
                return id;
            }
            candidate = candidate.saturating_add(1);
        }
    }
}
