use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::qr_session::QrSession;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait QrSessionRepository {
    async fn insert_qr_session(&self, session: &QrSession) -> Result<(), AppError>;
    async fn get_qr_session(&self, id: &Uuid) -> Result<Option<QrSession>, AppError>;
    async fn list_qr_sessions_for_issuer(&self, issuer_id: &Uuid) -> Result<Vec<QrSession>, AppError>;
    /// Soft-deactivation: flips `is_active` without deleting the row.
    /// Returns false when the session does not exist or belongs to a
    /// different issuer.
    async fn deactivate_qr_session(&self, id: &Uuid, issuer_id: &Uuid) -> Result<bool, AppError>;
}

const QR_SESSION_COLUMNS: &str =
    "id, teacher_id, teacher_name, class_section, subject, class_code, time_slot, qr_data, created_at, expires_at, is_active";

#[async_trait::async_trait]
impl QrSessionRepository for PostgresRepository {
    async fn insert_qr_session(&self, session: &QrSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO qr_session
                (id, teacher_id, teacher_name, class_section, subject, class_code, time_slot, qr_data, created_at, expires_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(session.id)
        .bind(session.teacher_id)
        .bind(&session.teacher_name)
        .bind(session.class_section)
        .bind(&session.subject)
        .bind(&session.class_code)
        .bind(&session.time_slot)
        .bind(&session.qr_data)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_qr_session(&self, id: &Uuid) -> Result<Option<QrSession>, AppError> {
        let session = sqlx::query_as::<_, QrSession>(&format!(
            r#"
            SELECT {QR_SESSION_COLUMNS}
            FROM qr_session
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn list_qr_sessions_for_issuer(&self, issuer_id: &Uuid) -> Result<Vec<QrSession>, AppError> {
        let sessions = sqlx::query_as::<_, QrSession>(&format!(
            r#"
            SELECT {QR_SESSION_COLUMNS}
            FROM qr_session
            WHERE teacher_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(issuer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn deactivate_qr_session(&self, id: &Uuid, issuer_id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE qr_session SET is_active = FALSE WHERE id = $1 AND teacher_id = $2")
            .bind(id)
            .bind(issuer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
