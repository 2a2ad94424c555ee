use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use sqlx::PgPool;
use std::ops::Deref;
use uuid::Uuid;

/// The authenticated principal, resolved from the private session
/// cookie. Derefs to the full user row so handlers can read the role,
/// section, and subject list directly.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

pub(crate) fn parse_session_cookie_value(value: &str) -> Option<(Uuid, Uuid)> {
    let (session_id_str, user_id_str) = value.split_once(':')?;
    let session_id = Uuid::parse_str(session_id_str).ok()?;
    let user_id = Uuid::parse_str(user_id_str).ok()?;
    Some((session_id, user_id))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let cookies = req.cookies();
        if let Some(cookie) = cookies.get_private("user")
            && let Some((session_id, user_id)) = parse_session_cookie_value(cookie.value())
        {
            let pool = match req.rocket().state::<PgPool>() {
                Some(pool) => pool,
                None => return Outcome::Error((Status::InternalServerError, AppError::Unauthorized)),
            };

            let repo = PostgresRepository { pool: pool.clone() };

            match repo.get_active_session_user(&session_id, &user_id).await {
                Ok(Some(user)) => {
                    let current_user = CurrentUser(user);
                    req.local_cache(|| Some(current_user.clone()));
                    return Outcome::Success(current_user);
                }
                Ok(None) => {
                    let _ = repo.delete_session_if_expired(&session_id).await;
                    return Outcome::Error((Status::Unauthorized, AppError::InvalidCredentials));
                }
                Err(err) => return Outcome::Error((Status::InternalServerError, err)),
            }
        }

        Outcome::Error((Status::Unauthorized, AppError::InvalidCredentials))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_session_cookie_value;
    use uuid::Uuid;

    #[test]
    fn parse_session_cookie_value_valid() {
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let value = format!("{}:{}", session_id, user_id);
        let parsed = parse_session_cookie_value(&value);
        assert!(matches!(parsed, Some((parsed_session_id, parsed_user_id)) if parsed_session_id == session_id && parsed_user_id == user_id));
    }

    #[test]
    fn parse_session_cookie_value_invalid_uuid() {
        let parsed = parse_session_cookie_value("not-a-uuid:also-not-a-uuid");
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_session_cookie_value_missing_delimiter() {
        let parsed = parse_session_cookie_value("missing-delimiter");
        assert!(parsed.is_none());
    }
}
