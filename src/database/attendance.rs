use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::attendance::AttendanceRecord;
use uuid::Uuid;

pub const ALREADY_MARKED: &str = "Attendance already marked for this session";

#[async_trait::async_trait]
pub trait AttendanceRepository {
    async fn get_attendance(&self, student_id: &str, qr_session_id: &Uuid) -> Result<Option<AttendanceRecord>, AppError>;
    /// Inserts one redemption. The `(student_id, qr_session_id)` unique
    /// constraint is the real duplicate guard; a violation surfaces as
    /// `AppError::Conflict` so racing redemptions and retries look the
    /// same to the caller.
    async fn insert_attendance(&self, record: &AttendanceRecord) -> Result<(), AppError>;
    async fn list_attendance_for_student(&self, student_id: &str) -> Result<Vec<AttendanceRecord>, AppError>;
    async fn list_attendance_for_issuer(&self, issuer_id: &Uuid) -> Result<Vec<AttendanceRecord>, AppError>;
    async fn list_all_attendance(&self) -> Result<Vec<AttendanceRecord>, AppError>;
}

const RECORD_COLUMNS: &str = "id, student_id, student_name, qr_session_id, class_section, subject, class_code, time_slot, marked_at";

#[async_trait::async_trait]
impl AttendanceRepository for PostgresRepository {
    async fn get_attendance(&self, student_id: &str, qr_session_id: &Uuid) -> Result<Option<AttendanceRecord>, AppError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_record
            WHERE student_id = $1 AND qr_session_id = $2
            "#,
        ))
        .bind(student_id)
        .bind(qr_session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_attendance(&self, record: &AttendanceRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_record
                (id, student_id, student_name, qr_session_id, class_section, subject, class_code, time_slot, marked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(&record.student_id)
        .bind(&record.student_name)
        .bind(record.qr_session_id)
        .bind(record.class_section)
        .bind(&record.subject)
        .bind(&record.class_code)
        .bind(&record.time_slot)
        .bind(record.marked_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(ALREADY_MARKED.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_attendance_for_student(&self, student_id: &str) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_record
            WHERE student_id = $1
            ORDER BY marked_at DESC
            "#,
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_attendance_for_issuer(&self, issuer_id: &Uuid) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT a.id, a.student_id, a.student_name, a.qr_session_id, a.class_section,
                   a.subject, a.class_code, a.time_slot, a.marked_at
            FROM attendance_record a
            JOIN qr_session q ON q.id = a.qr_session_id
            WHERE q.teacher_id = $1
            ORDER BY a.marked_at DESC
            "#,
        )
        .bind(issuer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_all_attendance(&self) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_record
            ORDER BY marked_at DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
