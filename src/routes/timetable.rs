use crate::auth::CurrentUser;
use crate::error::app_error::AppError;
use crate::models::timetable::{Timetable, TimetableView};
use crate::service::timetable::TimetableStore;
use rocket::State;
use rocket::routes;
use rocket::serde::json::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TimetableResponse {
    pub version: u64,
    pub timetable: TimetableView,
}

#[derive(Debug, Serialize)]
pub struct ReplaceTimetableResponse {
    pub version: u64,
}

/// Students get their own section's week; everyone else gets the full
/// table.
#[rocket::get("/")]
pub async fn get_timetable(store: &State<TimetableStore>, user: CurrentUser) -> Json<TimetableResponse> {
    let (timetable, version) = store.current();

    let view = match user.class_section {
        Some(section) if user.role.can_redeem() => TimetableView::Section(timetable.section_view(section)),
        _ => TimetableView::Full(timetable),
    };

    Json(TimetableResponse { version, timetable: view })
}

#[rocket::put("/", data = "<payload>")]
pub async fn replace_timetable(
    store: &State<TimetableStore>,
    user: CurrentUser,
    payload: Json<Timetable>,
) -> Result<Json<ReplaceTimetableResponse>, AppError> {
    if !user.role.can_manage_timetable() {
        return Err(AppError::Forbidden("You are not allowed to manage the timetable".to_string()));
    }

    let version = store.replace(payload.into_inner())?;
    Ok(Json(ReplaceTimetableResponse { version }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![get_timetable, replace_timetable]
}
