use crate::auth::CurrentUser;
use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{LoginRequest, RegisterRequest, Role, UserResponse};
use chrono::{Duration, Utc};
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::serde::json::Json;
use rocket::routes;
use sqlx::PgPool;
use validator::Validate;

/// Role-specific requirements the derive-level validation cannot express.
fn validate_role_fields(payload: &RegisterRequest) -> Result<(), AppError> {
    match payload.role {
        Role::Student => {
            if payload.student_id.as_deref().is_none_or(|s| s.trim().is_empty()) {
                return Err(AppError::BadRequest("Students must provide a student id".to_string()));
            }
            if payload.class_section.is_none() {
                return Err(AppError::BadRequest("Students must provide a class section".to_string()));
            }
        }
        Role::Teacher => {
            if payload.subjects.as_ref().is_none_or(|s| s.is_empty()) {
                return Err(AppError::BadRequest("Teachers must provide at least one subject".to_string()));
            }
        }
        _ => {}
    }
    Ok(())
}

#[rocket::post("/register", data = "<payload>")]
pub async fn register(pool: &State<PgPool>, payload: Json<RegisterRequest>) -> Result<(Status, Json<UserResponse>), AppError> {
    payload.validate()?;
    validate_role_fields(&payload)?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = repo.create_user(&payload).await?;

    Ok((Status::Created, Json(UserResponse::from(&user))))
}

#[rocket::post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    payload: Json<LoginRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };

    let Some(user) = repo.get_user_by_username(&payload.username).await? else {
        // Burn the same hashing time as a real verification.
        PostgresRepository::dummy_verify(&payload.password);
        return Err(AppError::InvalidCredentials);
    };
    repo.verify_password(&user, &payload.password).await?;

    let expires_at = Utc::now() + Duration::hours(config.session.ttl_hours);
    let session = repo.create_session(&user.id, expires_at).await?;

    let value = format!("{}:{}", session.id, user.id);
    cookies.add_private(
        Cookie::build(("user", value))
            .path("/")
            .http_only(true)
            .secure(config.session.cookie_secure)
            .same_site(SameSite::Lax)
            .build(),
    );

    Ok(Json(UserResponse::from(&user)))
}

#[rocket::post("/logout")]
pub async fn logout(pool: &State<PgPool>, cookies: &CookieJar<'_>) -> Result<Status, AppError> {
    if let Some(cookie) = cookies.get_private("user")
        && let Some((session_id, _)) = crate::auth::parse_session_cookie_value(cookie.value())
    {
        let repo = PostgresRepository { pool: pool.inner().clone() };
        repo.delete_session(&session_id).await?;
    }

    cookies.remove_private(Cookie::build("user").build());
    Ok(Status::Ok)
}

#[rocket::get("/me")]
pub async fn me(user: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user.0))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![register, login, logout, me]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::ClassSection;

    fn base_request(role: Role) -> RegisterRequest {
        RegisterRequest {
            username: "someone".to_string(),
            password: "long enough password".to_string(),
            role,
            student_id: None,
            class_section: None,
            subjects: None,
            full_name: "Someone".to_string(),
        }
    }

    #[test]
    fn students_need_id_and_section() {
        let mut request = base_request(Role::Student);
        assert!(validate_role_fields(&request).is_err());

        request.student_id = Some("S001".to_string());
        assert!(validate_role_fields(&request).is_err());

        request.class_section = Some(ClassSection::A5);
        assert!(validate_role_fields(&request).is_ok());
    }

    #[test]
    fn teachers_need_subjects() {
        let mut request = base_request(Role::Teacher);
        assert!(validate_role_fields(&request).is_err());

        request.subjects = Some(vec![]);
        assert!(validate_role_fields(&request).is_err());

        request.subjects = Some(vec!["Mathematics".to_string()]);
        assert!(validate_role_fields(&request).is_ok());
    }

    #[test]
    fn staff_roles_have_no_extra_requirements() {
        assert!(validate_role_fields(&base_request(Role::Principal)).is_ok());
        assert!(validate_role_fields(&base_request(Role::Verifier)).is_ok());
    }

    mod integration {
        use crate::{Config, build_rocket};
        use rocket::http::{ContentType, Status};
        use rocket::local::asynchronous::Client;

        #[rocket::async_test]
        #[ignore = "requires database"]
        async fn register_login_me_flow() {
            let client = Client::tracked(build_rocket(Config::load().expect("config")))
                .await
                .expect("valid rocket instance");

            let response = client
                .post("/api/auth/register")
                .header(ContentType::JSON)
                .body(
                    r#"{"username": "flow-teacher", "password": "long enough password",
                        "role": "teacher", "subjects": ["Mathematics"], "full_name": "Flow Teacher"}"#,
                )
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Created);

            let response = client
                .post("/api/auth/login")
                .header(ContentType::JSON)
                .body(r#"{"username": "flow-teacher", "password": "long enough password"}"#)
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);

            let response = client.get("/api/auth/me").dispatch().await;
            assert_eq!(response.status(), Status::Ok);
            let body = response.into_string().await.unwrap();
            assert!(body.contains("flow-teacher"));
        }

        #[rocket::async_test]
        #[ignore = "requires database"]
        async fn login_with_wrong_password_is_unauthorized() {
            let client = Client::tracked(build_rocket(Config::load().expect("config")))
                .await
                .expect("valid rocket instance");

            let response = client
                .post("/api/auth/login")
                .header(ContentType::JSON)
                .body(r#"{"username": "nobody-here", "password": "whatever password"}"#)
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Unauthorized);
        }
    }
}
