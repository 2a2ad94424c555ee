use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::qr_session::QrSessionRepository;
use crate::error::app_error::AppError;
use crate::models::qr_session::{QrSession, QrSessionRequest, QrSessionResponse};
use crate::service::qr_session::{ActivePeriod, AttendanceService, find_currently_active_periods};
use crate::service::timetable::TimetableStore;
use chrono::Utc;
use rocket::State;
use rocket::http::Status;
use rocket::routes;
use rocket::serde::json::Json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[rocket::post("/generate", data = "<payload>")]
pub async fn generate(
    pool: &State<PgPool>,
    user: CurrentUser,
    payload: Json<QrSessionRequest>,
) -> Result<(Status, Json<QrSessionResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = AttendanceService { repo: &repo };
    let response = service.create_session(&user, &payload, Utc::now()).await?;

    Ok((Status::Created, Json(response)))
}

/// Issues a session for whatever class the caller is teaching right now
/// according to the timetable. Saves typing the section, subject and
/// slot by hand between periods.
#[rocket::post("/generate-current")]
pub async fn generate_current(
    pool: &State<PgPool>,
    timetable: &State<TimetableStore>,
    user: CurrentUser,
) -> Result<(Status, Json<QrSessionResponse>), AppError> {
    if !user.role.can_issue_sessions() {
        return Err(AppError::Forbidden("Only teachers can generate QR codes".to_string()));
    }

    let subjects = user.subjects.clone().unwrap_or_default();
    let now = Utc::now();
    let (current, _) = timetable.current();
    let matches = find_currently_active_periods(&current, &subjects, now);
    let Some(active) = matches.first() else {
        return Err(AppError::NotFound("No class scheduled for you right now".to_string()));
    };

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = AttendanceService { repo: &repo };
    let response = service.create_session_for_period(&user, active, now).await?;

    Ok((Status::Created, Json(response)))
}

/// Lists the periods the caller is teaching at this moment, so the
/// client can offer them before auto-issuing.
#[rocket::get("/active")]
pub async fn active_periods(timetable: &State<TimetableStore>, user: CurrentUser) -> Result<Json<Vec<ActivePeriod>>, AppError> {
    if !user.role.can_issue_sessions() {
        return Err(AppError::Forbidden("Only teachers can query their active classes".to_string()));
    }

    let subjects = user.subjects.clone().unwrap_or_default();
    let (current, _) = timetable.current();
    Ok(Json(find_currently_active_periods(&current, &subjects, Utc::now())))
}

#[rocket::get("/sessions")]
pub async fn list_sessions(pool: &State<PgPool>, user: CurrentUser) -> Result<Json<Vec<QrSession>>, AppError> {
    if !user.role.can_issue_sessions() {
        return Err(AppError::Forbidden("Only teachers can list their sessions".to_string()));
    }

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let sessions = repo.list_qr_sessions_for_issuer(&user.id).await?;

    Ok(Json(sessions))
}

#[rocket::delete("/sessions/<id>")]
pub async fn deactivate_session(pool: &State<PgPool>, user: CurrentUser, id: &str) -> Result<Status, AppError> {
    if !user.role.can_issue_sessions() {
        return Err(AppError::Forbidden("Only teachers can deactivate sessions".to_string()));
    }

    let id = Uuid::parse_str(id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    // Ownership is part of the update predicate; a foreign session looks
    // the same as a missing one.
    if repo.deactivate_qr_session(&id, &user.id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound("Session not found".to_string()))
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![generate, generate_current, active_periods, list_sessions, deactivate_session]
}
