//! Core logic for the departmental timeline tracker.
//! Pure classification, grouping and policy live here next to the
//! repository that writes through the table store.

pub mod config;
pub mod db;
pub mod directory;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod schedule;
pub mod store;
pub mod view;

pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{Entry, EntryDraft, EntryField, EntryId, EntryPatch};
pub use model::fields::{Priority, ValidationError, Visibility};
pub use model::project::{
    Project, ProjectDraft, ProjectField, ProjectId, ProjectPatch, ProjectStatus,
};
pub use model::user::{Role, User, UserDraft};
pub use policy::{can_manage_users, can_mutate, can_view};
pub use repo::{
    LoadOutcome, Notification, NotificationKind, NotificationSink, RemoteOutcome,
    TimelineRepository, TrackerError, TrackerResult, UserDirectory, UserLoadOutcome,
    WriteOutcome,
};
pub use schedule::{classify_deadline, DeadlineBucket};
pub use store::{SqliteTableStore, StoreError, TableStore, UnconfiguredStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
