use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::attendance::{AttendanceRecord, MarkAttendanceRequest};
use crate::service::qr_session::AttendanceService;
use chrono::Utc;
use rocket::State;
use rocket::http::Status;
use rocket::routes;
use rocket::serde::json::Json;
use sqlx::PgPool;
use validator::Validate;

#[rocket::post("/mark", data = "<payload>")]
pub async fn mark(
    pool: &State<PgPool>,
    user: CurrentUser,
    payload: Json<MarkAttendanceRequest>,
) -> Result<(Status, Json<AttendanceRecord>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = AttendanceService { repo: &repo };
    let record = service.mark_attendance(&user, &payload.qr_data, Utc::now()).await?;

    Ok((Status::Created, Json(record)))
}

#[rocket::get("/records")]
pub async fn records(pool: &State<PgPool>, user: CurrentUser) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = AttendanceService { repo: &repo };
    let records = service.records_for(&user).await?;

    Ok(Json(records))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![mark, records]
}
