use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, Result},
    models::UserRole,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub authorities: Vec<UserRole>,
    pub exp: usize,
}

impl Claims {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.authorities.contains(&role)
    }
}

pub fn generate_token(
    config: &AuthConfig,
    user_id: i64,
    username: &str,
    roles: &[UserRole],
) -> Result<String> {
    let duration = chrono::Duration::try_seconds(config.jwt_duration)
        .ok_or_else(|| AppError::ConfigError("Invalid JWT_DURATION value".to_string()))?;

    let expiration = chrono::Utc::now()
        .checked_add_signed(duration)
        .ok_or_else(|| AppError::InternalError("Failed to calculate expiration".to_string()))?
        .timestamp()
        .max(0) as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        authorities: roles.to_vec(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token generation failed: {}", e)))
}

pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::Unauthorized("Token inválido".to_string())
    })
}
