use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{
    error::{AppError, FieldMessage, Result},
    models::UserRole,
    utils::jwt::Claims,
};

pub fn extract_user_id(claims: &Claims) -> Result<i64> {
    claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))
}

/// Admins may access any resource; everyone else only their own.
pub fn validate_self_or_admin(claims: &Claims, owner_id: i64) -> Result<()> {
    if claims.has_role(UserRole::Admin) || extract_user_id(claims)? == owner_id {
        return Ok(());
    }
    Err(AppError::Forbidden("Acesso negado".to_string()))
}

/// JSON body that has passed `validator` checks.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::JsonDataError(e) => {
                    AppError::Validation(vec![FieldMessage::new("body", e.body_text())])
                }
                other => AppError::BadRequest(other.body_text()),
            })?;

        value.validate()?;

        Ok(Self(value))
    }
}

/// `Path` whose parse failures use the JSON error body.
pub struct AppPath<T>(pub T);

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}

/// `Query` whose parse failures use the JSON error body.
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, roles: &[UserRole]) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: "someone@gmail.com".to_string(),
            authorities: roles.to_vec(),
            exp: usize::MAX,
        }
    }

    #[test]
    fn owner_may_access() {
        assert!(validate_self_or_admin(&claims("1", &[UserRole::Client]), 1).is_ok());
    }

    #[test]
    fn admin_may_access_any_owner() {
        assert!(validate_self_or_admin(&claims("3", &[UserRole::Admin]), 1).is_ok());
    }

    #[test]
    fn other_client_is_forbidden() {
        let result = validate_self_or_admin(&claims("1", &[UserRole::Client]), 2);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn malformed_subject_is_unauthorized() {
        let result = extract_user_id(&claims("not-a-number", &[UserRole::Client]));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
