use crate::database::attendance::{ALREADY_MARKED, AttendanceRepository};
use crate::database::qr_session::QrSessionRepository;
use crate::error::app_error::AppError;
use crate::models::attendance::AttendanceRecord;
use crate::models::qr_session::QrSession;
use crate::models::user::{ClassSection, Role, User};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory stand-in for the Postgres repository, for exercising the
/// service layer without a database. Mirrors the storage semantics the
/// service relies on, including the one-redemption-per-student guarantee.
#[derive(Default)]
pub struct MemoryRepository {
    qr_sessions: Mutex<HashMap<Uuid, QrSession>>,
    attendance: Mutex<Vec<AttendanceRecord>>,
}

impl MemoryRepository {
    pub fn attendance_count(&self) -> usize {
        self.attendance.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl QrSessionRepository for MemoryRepository {
    async fn insert_qr_session(&self, session: &QrSession) -> Result<(), AppError> {
        self.qr_sessions.lock().unwrap().insert(session.id, session.clone());
        Ok(())
    }

    async fn get_qr_session(&self, id: &Uuid) -> Result<Option<QrSession>, AppError> {
        Ok(self.qr_sessions.lock().unwrap().get(id).cloned())
    }

    async fn list_qr_sessions_for_issuer(&self, issuer_id: &Uuid) -> Result<Vec<QrSession>, AppError> {
        let mut sessions: Vec<QrSession> = self
            .qr_sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.teacher_id == *issuer_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn deactivate_qr_session(&self, id: &Uuid, issuer_id: &Uuid) -> Result<bool, AppError> {
        let mut sessions = self.qr_sessions.lock().unwrap();
        match sessions.get_mut(id) {
            Some(session) if session.teacher_id == *issuer_id => {
                session.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl AttendanceRepository for MemoryRepository {
    async fn get_attendance(&self, student_id: &str, qr_session_id: &Uuid) -> Result<Option<AttendanceRecord>, AppError> {
        Ok(self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.student_id == student_id && r.qr_session_id == *qr_session_id)
            .cloned())
    }

    async fn insert_attendance(&self, record: &AttendanceRecord) -> Result<(), AppError> {
        let mut records = self.attendance.lock().unwrap();
        // Same conflict the unique constraint raises in Postgres.
        if records
            .iter()
            .any(|r| r.student_id == record.student_id && r.qr_session_id == record.qr_session_id)
        {
            return Err(AppError::Conflict(ALREADY_MARKED.to_string()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list_attendance_for_student(&self, student_id: &str) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_attendance_for_issuer(&self, issuer_id: &Uuid) -> Result<Vec<AttendanceRecord>, AppError> {
        let sessions = self.qr_sessions.lock().unwrap();
        Ok(self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .filter(|r| sessions.get(&r.qr_session_id).is_some_and(|s| s.teacher_id == *issuer_id))
            .cloned()
            .collect())
    }

    async fn list_all_attendance(&self) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self.attendance.lock().unwrap().clone())
    }
}

pub fn user_with_role(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        username: format!("user-{}", Uuid::new_v4()),
        password_hash: String::new(),
        role,
        student_id: None,
        class_section: None,
        subjects: None,
        full_name: "Test User".to_string(),
        created_at: Utc::now(),
    }
}

pub fn teacher(subjects: &[&str]) -> User {
    let mut user = user_with_role(Role::Teacher);
    user.subjects = Some(subjects.iter().map(|s| s.to_string()).collect());
    user.full_name = "Test Teacher".to_string();
    user
}

pub fn student(student_id: &str, class_section: ClassSection) -> User {
    let mut user = user_with_role(Role::Student);
    user.student_id = Some(student_id.to_string());
    user.class_section = Some(class_section);
    user.full_name = format!("Student {}", student_id);
    user
}
