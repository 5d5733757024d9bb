//! Department and division reference data.
//!
//! # Responsibility
//! - Hold the static organization chart (departments and their divisions).
//! - Answer name lookups and assignment checks for entries, projects and users.
//!
//! # Invariants
//! - Data is read-only at runtime.
//! - Division ids are unique within their department.

use crate::model::fields::ValidationError;
use serde::Serialize;

/// A division inside one department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Division {
    pub id: &'static str,
    pub name: &'static str,
}

/// A department with its ordered division list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Department {
    pub id: &'static str,
    pub name: &'static str,
    pub divisions: &'static [Division],
}

impl Department {
    /// Returns one division of this department.
    pub fn division(&self, division_id: &str) -> Option<&'static Division> {
        self.divisions.iter().find(|division| division.id == division_id)
    }
}

const KABINET_DEPARTMENT_ID: &str = "kabinet";

static DEPARTMENTS: &[Department] = &[
    Department {
        id: KABINET_DEPARTMENT_ID,
        name: "Kabinet",
        divisions: &[Division {
            id: "kabinet",
            name: "Kabinet",
        }],
    },
    Department {
        id: "kesekjenan",
        name: "Kesekjenan",
        divisions: &[
            Division {
                id: "sekretaris",
                name: "Sekretaris",
            },
            Division {
                id: "bendahara",
                name: "Bendahara",
            },
        ],
    },
    Department {
        id: "ekonomi_kreatif",
        name: "Ekonomi Kreatif",
        divisions: &[
            Division {
                id: "kewirausahaan",
                name: "Kewirausahaan",
            },
            Division {
                id: "sponsorship",
                name: "Sponsorship",
            },
        ],
    },
    Department {
        id: "media_komunikasi",
        name: "Media dan Komunikasi",
        divisions: &[
            Division {
                id: "hubungan_eksternal",
                name: "Hubungan Eksternal",
            },
            Division {
                id: "media_publikasi",
                name: "Media dan Publikasi",
            },
        ],
    },
    Department {
        id: "sdm",
        name: "Sumber Daya Manusia",
        divisions: &[
            Division {
                id: "manajemen_sdm",
                name: "Managemen Sumber Daya Manusia",
            },
            Division {
                id: "pengembangan_sdm",
                name: "Pengembangan Sumber Daya Manusia",
            },
        ],
    },
    Department {
        id: "kesejahteraan_mahasiswa",
        name: "Kesejahteraan Mahasiswa",
        divisions: &[
            Division {
                id: "minat_bakat",
                name: "Minat dan Bakat",
            },
            Division {
                id: "rumah_tangga",
                name: "Rumah Tangga Himpunan",
            },
        ],
    },
    Department {
        id: "riset_teknologi",
        name: "Riset dan Teknologi",
        divisions: &[
            Division {
                id: "akademik",
                name: "Akademik",
            },
            Division {
                id: "pengembangan_teknologi",
                name: "Pengembangan Teknologi",
            },
        ],
    },
];

/// All departments in display order.
pub fn departments() -> &'static [Department] {
    DEPARTMENTS
}

pub fn department(department_id: &str) -> Option<&'static Department> {
    DEPARTMENTS
        .iter()
        .find(|department| department.id == department_id)
}

/// Department display name, or an empty string for unknown ids.
pub fn department_name(department_id: &str) -> &'static str {
    department(department_id).map_or("", |department| department.name)
}

/// Division display name, or an empty string when either id is unknown.
pub fn division_name(department_id: &str, division_id: &str) -> &'static str {
    department(department_id)
        .and_then(|department| department.division(division_id))
        .map_or("", |division| division.name)
}

/// Divisions of one department; empty for unknown ids.
pub fn divisions_of(department_id: &str) -> &'static [Division] {
    match department(department_id) {
        Some(department) => department.divisions,
        None => &[],
    }
}

/// Division preselected when a department is chosen.
///
/// Only the single-division cabinet has an implicit default.
pub fn default_division_for(department_id: &str) -> Option<&'static str> {
    if department_id == KABINET_DEPARTMENT_ID {
        return Some(KABINET_DEPARTMENT_ID);
    }
    None
}

/// Checks an optional department/division pair against the directory.
///
/// # Errors
/// - `UnknownDepartment` when the department id is not listed.
/// - `DivisionWithoutDepartment` when only a division is given.
/// - `DivisionNotInDepartment` when the division belongs elsewhere.
pub fn validate_assignment(
    department_id: Option<&str>,
    division_id: Option<&str>,
) -> Result<(), ValidationError> {
    match (department_id, division_id) {
        (None, None) => Ok(()),
        (None, Some(division)) => Err(ValidationError::DivisionWithoutDepartment(
            division.to_string(),
        )),
        (Some(department_id), division_id) => {
            let department = department(department_id)
                .ok_or_else(|| ValidationError::UnknownDepartment(department_id.to_string()))?;
            match division_id {
                Some(division) if department.division(division).is_none() => {
                    Err(ValidationError::DivisionNotInDepartment {
                        department: department_id.to_string(),
                        division: division.to_string(),
                    })
                }
                _ => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        default_division_for, department_name, departments, division_name, divisions_of,
        validate_assignment,
    };
    use crate::model::fields::ValidationError;
    use std::collections::HashSet;

    #[test]
    fn department_ids_are_unique_and_divisions_unique_within_department() {
        let mut seen = HashSet::new();
        for department in departments() {
            assert!(seen.insert(department.id), "duplicate {}", department.id);
            let divisions: HashSet<_> = department.divisions.iter().map(|d| d.id).collect();
            assert_eq!(divisions.len(), department.divisions.len());
        }
        assert_eq!(departments().len(), 7);
    }

    #[test]
    fn lookups_resolve_names_and_fall_back_to_empty() {
        assert_eq!(department_name("sdm"), "Sumber Daya Manusia");
        assert_eq!(department_name("nope"), "");
        assert_eq!(division_name("kesekjenan", "bendahara"), "Bendahara");
        assert_eq!(division_name("kesekjenan", "akademik"), "");
        assert_eq!(divisions_of("riset_teknologi").len(), 2);
        assert!(divisions_of("nope").is_empty());
    }

    #[test]
    fn only_kabinet_has_default_division() {
        assert_eq!(default_division_for("kabinet"), Some("kabinet"));
        assert_eq!(default_division_for("sdm"), None);
    }

    #[test]
    fn assignment_checks_membership() {
        assert!(validate_assignment(None, None).is_ok());
        assert!(validate_assignment(Some("sdm"), None).is_ok());
        assert!(validate_assignment(Some("sdm"), Some("manajemen_sdm")).is_ok());
        assert_eq!(
            validate_assignment(Some("sdm"), Some("akademik")),
            Err(ValidationError::DivisionNotInDepartment {
                department: "sdm".to_string(),
                division: "akademik".to_string(),
            })
        );
        assert_eq!(
            validate_assignment(None, Some("akademik")),
            Err(ValidationError::DivisionWithoutDepartment(
                "akademik".to_string()
            ))
        );
        assert_eq!(
            validate_assignment(Some("ghost"), None),
            Err(ValidationError::UnknownDepartment("ghost".to_string()))
        );
    }
}
