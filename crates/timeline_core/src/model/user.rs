//! User identity consumed by the access policy, and the input for adding users.

use crate::directory::department;
use crate::model::fields::{normalize_id, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("valid username regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    HeadDepartment,
}

impl Role {
    /// Stable string stored in `users.role`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::HeadDepartment => "head_department",
        }
    }
}

pub fn parse_role(value: &str) -> Option<Role> {
    match value {
        "admin" => Some(Role::Admin),
        "head_department" => Some(Role::HeadDepartment),
        _ => None,
    }
}

/// Authenticated caller.
///
/// `department_id` is set iff `role == Role::HeadDepartment`. `secret` is
/// the plaintext for built-in users and a PHC hash for users added through
/// [`crate::repo::UserDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub secret: String,
    pub role: Role,
    pub department_id: Option<String>,
}

impl User {
    pub fn admin(
        id: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            secret: secret.into(),
            role: Role::Admin,
            department_id: None,
        }
    }

    pub fn head_of(
        department_id: impl Into<String>,
        id: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            secret: secret.into(),
            role: Role::HeadDepartment,
            department_id: Some(department_id.into()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Checks username shape, secret presence and the role/department rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identity(
            &self.username,
            &self.secret,
            self.role,
            self.department_id.as_deref(),
        )
    }
}

fn validate_identity(
    username: &str,
    secret: &str,
    role: Role,
    department_id: Option<&str>,
) -> Result<(), ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::InvalidUsername(username.to_string()));
    }
    if secret.is_empty() {
        return Err(ValidationError::EmptySecret);
    }
    match (role, department_id) {
        (Role::Admin, None) => Ok(()),
        (Role::Admin, Some(department_id)) => Err(ValidationError::UnexpectedDepartment(
            department_id.to_string(),
        )),
        (Role::HeadDepartment, None) => Err(ValidationError::MissingDepartment),
        (Role::HeadDepartment, Some(department_id)) => {
            if department(department_id).is_none() {
                return Err(ValidationError::UnknownDepartment(
                    department_id.to_string(),
                ));
            }
            Ok(())
        }
    }
}

/// Input for adding a user; the directory issues the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub username: String,
    pub secret: String,
    pub role: Role,
    pub department_id: Option<String>,
}

impl UserDraft {
    pub fn admin(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
            role: Role::Admin,
            department_id: None,
        }
    }

    pub fn head_of(
        department_id: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
            role: Role::HeadDepartment,
            department_id: Some(department_id.into()),
        }
    }

    /// Trims the username and drops a blank department id.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.department_id = normalize_id(self.department_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identity(
            &self.username,
            &self.secret,
            self.role,
            self.department_id.as_deref(),
        )
    }

    /// Materializes the draft under `id`, keeping `secret` as given.
    pub fn into_user(self, id: impl Into<String>) -> User {
        User {
            id: id.into(),
            username: self.username,
            secret: self.secret,
            role: self.role,
            department_id: self.department_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_role, Role, User, UserDraft};
    use crate::model::fields::ValidationError;

    #[test]
    fn head_department_requires_known_department() {
        let mut head = User::head_of("kesekjenan", "2", "kesekjenan_head", "dept123");
        assert!(head.validate().is_ok());

        head.department_id = Some("ghost".to_string());
        assert_eq!(
            head.validate(),
            Err(ValidationError::UnknownDepartment("ghost".to_string()))
        );

        head.department_id = None;
        assert_eq!(head.validate(), Err(ValidationError::MissingDepartment));
    }

    #[test]
    fn admin_must_not_carry_department() {
        let mut admin = User::admin("1", "admin", "admin123");
        assert!(admin.validate().is_ok());
        admin.department_id = Some("sdm".to_string());
        assert!(matches!(
            admin.validate(),
            Err(ValidationError::UnexpectedDepartment(_))
        ));
    }

    #[test]
    fn username_and_secret_are_checked() {
        let user = User::admin("1", "a b", "x");
        assert!(matches!(
            user.validate(),
            Err(ValidationError::InvalidUsername(_))
        ));
        let user = User::admin("1", "admin", "");
        assert_eq!(user.validate(), Err(ValidationError::EmptySecret));
    }

    #[test]
    fn role_strings_match_the_users_table() {
        for role in [Role::Admin, Role::HeadDepartment] {
            assert_eq!(parse_role(role.as_str()), Some(role));
        }
        assert_eq!(parse_role("Admin"), None);
    }

    #[test]
    fn draft_normalization_trims_and_drops_blank_department() {
        let mut draft = UserDraft::head_of("  ", " media_head ", "secret").normalized();
        assert_eq!(draft.username, "media_head");
        assert_eq!(draft.department_id, None);
        assert_eq!(draft.validate(), Err(ValidationError::MissingDepartment));

        draft.department_id = Some("media_komunikasi".to_string());
        let user = draft.into_user("9");
        assert_eq!(user.id, "9");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn serialization_never_exposes_secret() {
        let user = User::admin("1", "admin", "admin123");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json["role"], "admin");
        assert_eq!(user.role, Role::Admin);
    }
}
