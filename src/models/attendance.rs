use crate::models::user::ClassSection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One successful redemption. Subject, section, code and slot are copied
/// from the session at marking time so record queries never need a join.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub qr_session_id: Uuid,
    pub class_section: ClassSection,
    pub subject: String,
    pub class_code: String,
    pub time_slot: String,
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarkAttendanceRequest {
    #[validate(length(min = 1))]
    pub qr_data: String,
}
