//! Value parsers for command-line arguments.

use chrono::{DateTime, NaiveDate, Utc};
use timeline_core::directory::department;
use timeline_core::model::fields::{parse_priority, Priority};
use timeline_core::model::project::{parse_project_status, ProjectStatus};
use timeline_core::model::user::{parse_role, Role};
use timeline_core::User;

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 instant.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("date out of range: {value}"));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got `{value}`"))
}

pub fn parse_priority_arg(value: &str) -> Result<Priority, String> {
    parse_priority(value).ok_or_else(|| format!("expected High, Mid or Low, got `{value}`"))
}

pub fn parse_status_arg(value: &str) -> Result<ProjectStatus, String> {
    parse_project_status(value).ok_or_else(|| {
        format!("expected ongoing, on_hold, canceled or completed, got `{value}`")
    })
}

pub fn parse_role_arg(value: &str) -> Result<Role, String> {
    parse_role(value).ok_or_else(|| format!("expected admin or head_department, got `{value}`"))
}

/// Parses `YYYY-MM` into `(year, month)`.
pub fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("expected YYYY-MM, got `{value}`");
    let (year, month) = value.split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// `--as` value; usernames are resolved once the user directory is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerArg {
    Username(String),
    /// `head:<department>`: an ad hoc head of that department.
    Head(String),
}

impl CallerArg {
    pub fn resolve(&self, users: &[User]) -> Result<User, String> {
        match self {
            Self::Username(username) => users
                .iter()
                .find(|user| &user.username == username)
                .cloned()
                .ok_or_else(|| format!("unknown user `{username}`")),
            Self::Head(department_id) => Ok(User::head_of(
                department_id.as_str(),
                format!("cli-{department_id}"),
                format!("{department_id}_head"),
                "cli",
            )),
        }
    }
}

pub fn parse_caller(value: &str) -> Result<CallerArg, String> {
    if let Some(department_id) = value.strip_prefix("head:") {
        if department(department_id).is_none() {
            return Err(format!("unknown department `{department_id}`"));
        }
        return Ok(CallerArg::Head(department_id.to_string()));
    }
    if value.trim().is_empty() {
        return Err("expected a username or head:<department>".to_string());
    }
    Ok(CallerArg::Username(value.to_string()))
}
