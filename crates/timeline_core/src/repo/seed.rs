//! Built-in dataset shown when the initial load fails, plus the built-in users.

use crate::model::entry::Entry;
use crate::model::fields::{Priority, Visibility};
use crate::model::project::{Project, ProjectStatus};
use crate::model::user::User;
use chrono::{DateTime, TimeZone, Utc};

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn seed_project(
    id: &str,
    title: &str,
    pic: &str,
    description: &str,
    (start_date, deadline): (DateTime<Utc>, DateTime<Utc>),
    (hmif_priority, department_priority): (Priority, Priority),
    (department_id, division_id): (&str, &str),
    status: ProjectStatus,
) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        person_in_charge: pic.to_string(),
        description: description.to_string(),
        start_date,
        deadline,
        hmif_priority,
        department_priority,
        department_id: Some(department_id.to_string()),
        division_id: Some(division_id.to_string()),
        status,
        on_hold_reason: None,
    }
}

/// Three entries from May and June 2024 with three projects between them.
pub fn seed_entries() -> Vec<Entry> {
    let mut market_analysis = seed_project(
        "p3",
        "Market Analysis",
        "Jane Smith",
        "Analyze current market trends",
        (day(2024, 5, 10), day(2024, 5, 12)),
        (Priority::Mid, Priority::Mid),
        ("ekonomi_kreatif", "kewirausahaan"),
        ProjectStatus::OnHold,
    );
    market_analysis.on_hold_reason = Some("Waiting for additional market data".to_string());

    vec![
        Entry {
            id: "1".to_string(),
            title: "Project Kickoff".to_string(),
            person_in_charge: "John Doe".to_string(),
            description: "Initial meeting with the team to discuss project goals and timeline"
                .to_string(),
            start_date: day(2024, 5, 1),
            end_date: day(2024, 5, 1),
            hmif_priority: Priority::High,
            department_priority: Priority::High,
            visibility: Visibility::Public,
            department_id: Some("kesekjenan".to_string()),
            division_id: Some("sekretaris".to_string()),
            projects: vec![
                seed_project(
                    "p1",
                    "Requirements Gathering",
                    "Sarah Lee",
                    "Collect and document all project requirements",
                    (day(2024, 5, 1), day(2024, 5, 5)),
                    (Priority::High, Priority::High),
                    ("kesekjenan", "sekretaris"),
                    ProjectStatus::Ongoing,
                ),
                seed_project(
                    "p2",
                    "Team Assignment",
                    "John Doe",
                    "Assign team members to specific tasks",
                    (day(2024, 5, 1), day(2024, 5, 3)),
                    (Priority::Mid, Priority::High),
                    ("kesekjenan", "sekretaris"),
                    ProjectStatus::Completed,
                ),
            ],
        },
        Entry {
            id: "2".to_string(),
            title: "Research Phase".to_string(),
            person_in_charge: "Jane Smith".to_string(),
            description: "Conduct market research and competitor analysis".to_string(),
            start_date: day(2024, 5, 10),
            end_date: day(2024, 5, 15),
            hmif_priority: Priority::Mid,
            department_priority: Priority::Mid,
            visibility: Visibility::Public,
            department_id: Some("ekonomi_kreatif".to_string()),
            division_id: Some("kewirausahaan".to_string()),
            projects: vec![market_analysis],
        },
        Entry {
            id: "3".to_string(),
            title: "Vacation Planning".to_string(),
            person_in_charge: "Alex Johnson".to_string(),
            description: "Research destinations and book flights".to_string(),
            start_date: day(2024, 6, 15),
            end_date: day(2024, 6, 20),
            hmif_priority: Priority::Low,
            department_priority: Priority::Low,
            visibility: Visibility::Private,
            department_id: Some("sdm".to_string()),
            division_id: Some("manajemen_sdm".to_string()),
            projects: Vec::new(),
        },
    ]
}

/// The administrator and the kesekjenan head, always present in a
/// [`crate::repo::UserDirectory`] unless a stored user takes the username.
pub fn seed_users() -> Vec<User> {
    vec![
        User::admin("1", "admin", "admin123"),
        User::head_of("kesekjenan", "2", "kesekjenan_head", "dept123"),
    ]
}

#[cfg(test)]
mod tests {
    use super::{seed_entries, seed_users};

    #[test]
    fn seed_dataset_satisfies_record_invariants() {
        for entry in seed_entries() {
            entry.validate().unwrap();
            assert!(entry.end_date >= entry.start_date);
            for project in &entry.projects {
                project.validate().unwrap();
                assert!(project.deadline >= project.start_date);
            }
        }
    }

    #[test]
    fn seed_users_are_valid() {
        for user in seed_users() {
            user.validate().unwrap();
        }
    }
}
