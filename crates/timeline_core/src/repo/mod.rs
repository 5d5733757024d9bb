//! Timeline repository: the write path over the table store.
//!
//! # Responsibility
//! - Hold the in-memory entries collection behind use-case operations.
//! - Apply the two-tier write policy (remote, then local fallback with a
//!   warning notification).
//! - Provide the seed dataset and built-in users.
//! - Keep the user directory and let admins add users.
//!
//! # Invariants
//! - No ambient session: every operation takes the caller explicitly.
//! - Only the initial load reports a remote failure as an error; writes
//!   report it as a `RemoteOutcome::LocalOnly` warning.

mod error;
mod notify;
pub mod seed;
mod timeline_repo;
mod user_directory;

pub use error::{RecordKind, TrackerError, TrackerResult};
pub use notify::{CollectingSink, LogSink, Notification, NotificationKind, NotificationSink};
pub use timeline_repo::{LoadOutcome, RemoteOutcome, Snapshot, TimelineRepository, WriteOutcome};
pub use user_directory::{UserDirectory, UserLoadOutcome};
