use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Caller role. Authorization decisions go through the capability
/// predicates below instead of matching on the role at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Principal,
    Verifier,
    InstitutionAdmin,
    SystemAdmin,
}

impl Role {
    pub fn can_issue_sessions(self) -> bool {
        matches!(self, Role::Teacher | Role::Principal)
    }

    pub fn can_redeem(self) -> bool {
        matches!(self, Role::Student)
    }

    pub fn can_see_all_records(self) -> bool {
        matches!(self, Role::Principal | Role::InstitutionAdmin | Role::SystemAdmin)
    }

    pub fn can_manage_timetable(self) -> bool {
        matches!(self, Role::Principal | Role::InstitutionAdmin | Role::SystemAdmin)
    }
}

/// Fixed set of class sections. Anything else is rejected at the type
/// boundary, both in JSON payloads and in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "class_section")]
pub enum ClassSection {
    A5,
    A6,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub class_section: Option<ClassSection>,
    pub subjects: Option<Vec<String>>,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub class_section: Option<ClassSection>,
    pub subjects: Option<Vec<String>>,
    #[validate(length(min = 1))]
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub class_section: Option<ClassSection>,
    pub subjects: Option<Vec<String>>,
    pub full_name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            student_id: user.student_id.clone(),
            class_section: user.class_section,
            subjects: user.subjects.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuing_is_limited_to_teaching_staff() {
        assert!(Role::Teacher.can_issue_sessions());
        assert!(Role::Principal.can_issue_sessions());
        assert!(!Role::Student.can_issue_sessions());
        assert!(!Role::Verifier.can_issue_sessions());
        assert!(!Role::SystemAdmin.can_issue_sessions());
    }

    #[test]
    fn only_students_redeem() {
        assert!(Role::Student.can_redeem());
        assert!(!Role::Teacher.can_redeem());
        assert!(!Role::Principal.can_redeem());
    }

    #[test]
    fn admin_tier_sees_all_records() {
        assert!(Role::Principal.can_see_all_records());
        assert!(Role::InstitutionAdmin.can_see_all_records());
        assert!(Role::SystemAdmin.can_see_all_records());
        assert!(!Role::Teacher.can_see_all_records());
        assert!(!Role::Verifier.can_see_all_records());
    }

    #[test]
    fn class_section_rejects_unknown_values() {
        assert!(serde_json::from_str::<ClassSection>("\"A5\"").is_ok());
        assert!(serde_json::from_str::<ClassSection>("\"B1\"").is_err());
    }

    #[test]
    fn role_uses_snake_case_on_the_wire() {
        let role: Role = serde_json::from_str("\"institution_admin\"").unwrap();
        assert_eq!(role, Role::InstitutionAdmin);
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
    }
}
