use crate::model::credential::CredentialError;
use crate::model::fields::ValidationError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record family named by a [`TrackerError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Entry,
    Project,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Project => "project",
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Failure taxonomy of repository operations.
///
/// `ValidationFailed`, `NotFound`, `PermissionDenied` and `Credential` abort
/// before any store call. The remote variants are fatal only for the initial load;
/// writes report them through [`crate::repo::RemoteOutcome::LocalOnly`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    ValidationFailed(ValidationError),
    RemoteUnavailable(String),
    RemoteRejected(String),
    NotFound { kind: RecordKind, id: String },
    PermissionDenied,
    /// A new user's secret could not be hashed.
    Credential(CredentialError),
}

impl TrackerError {
    pub fn not_found(kind: RecordKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this error came from the table store.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_) | Self::RemoteRejected(_))
    }
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationFailed(err) => write!(f, "validation failed: {err}"),
            Self::RemoteUnavailable(message) => write!(f, "remote store unavailable: {message}"),
            Self::RemoteRejected(message) => write!(f, "remote store rejected write: {message}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::PermissionDenied => write!(f, "caller may not modify this record"),
            Self::Credential(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ValidationFailed(err) => Some(err),
            Self::Credential(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for TrackerError {
    fn from(value: ValidationError) -> Self {
        Self::ValidationFailed(value)
    }
}

impl From<CredentialError> for TrackerError {
    fn from(value: CredentialError) -> Self {
        Self::Credential(value)
    }
}

impl From<StoreError> for TrackerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(message) => Self::RemoteUnavailable(message),
            StoreError::Rejected(message) => Self::RemoteRejected(message),
            err @ StoreError::InvalidRow(_) => Self::RemoteRejected(err.to_string()),
        }
    }
}
