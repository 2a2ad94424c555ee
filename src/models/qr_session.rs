use crate::models::user::ClassSection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One attendance opportunity for a class section. Append-only: rows are
/// never deleted, and only `is_active` may flip after creation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QrSession {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub class_section: ClassSection,
    pub subject: String,
    pub class_code: String,
    pub time_slot: String,
    pub qr_data: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Canonical payload embedded in the QR image. The scanning client sends
/// this JSON back verbatim when marking attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload {
    pub session_id: Uuid,
    pub teacher_id: Uuid,
    pub class_section: ClassSection,
    pub subject: String,
    pub time_slot: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QrSessionRequest {
    pub class_section: ClassSection,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub class_code: String,
    #[validate(length(min = 1))]
    pub time_slot: String,
}

#[derive(Debug, Serialize)]
pub struct QrSessionResponse {
    pub session_id: Uuid,
    pub qr_image: String,
    pub qr_data: String,
    pub expires_at: DateTime<Utc>,
    pub class_section: ClassSection,
    pub subject: String,
    pub time_slot: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_payload_round_trips_as_json() {
        let payload = QrPayload {
            session_id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            class_section: ClassSection::A5,
            subject: "Mathematics".to_string(),
            time_slot: "09:30-10:30".to_string(),
            created_at: Utc::now(),
        };

        let encoded = serde_json::to_string(&payload).unwrap();
        let decoded: QrPayload = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn qr_payload_uses_iso_8601_timestamps() {
        let payload = QrPayload {
            session_id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            class_section: ClassSection::A6,
            subject: "Physics".to_string(),
            time_slot: "10:30-11:30".to_string(),
            created_at: "2024-09-02T08:00:00Z".parse().unwrap(),
        };

        let value: serde_json::Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["created_at"], "2024-09-02T08:00:00Z");
        assert_eq!(value["class_section"], "A6");
    }
}
