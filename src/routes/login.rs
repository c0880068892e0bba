use axum::{
    Form, Json,
    extract::State,
    http::HeaderMap,
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    AppState,
    config::AuthConfig,
    error::{AppError, Result},
    models::{TokenRequest, TokenResponse},
    queries::user_queries,
    utils::jwt,
};

/// OAuth2 password grant. The client authenticates with HTTP Basic.
pub async fn issue_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    verify_client(&state.auth, &headers)?;

    if payload.grant_type != "password" {
        return Err(AppError::BadRequest("grant_type não suportado".to_string()));
    }

    let user = user_queries::find_by_email(&state.db, &payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuário ou senha inválidos".to_string()))?;

    let is_valid = bcrypt::verify(&payload.password, &user.password)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    if !is_valid {
        return Err(AppError::Unauthorized("Usuário ou senha inválidos".to_string()));
    }

    let roles = user_queries::get_roles(&state.db, user.id).await?;
    let token = jwt::generate_token(&state.auth, user.id, &user.email, &roles)?;

    tracing::info!("Token issued for user {}", user.id);

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.jwt_duration,
    }))
}

fn verify_client(config: &AuthConfig, headers: &HeaderMap) -> Result<()> {
    let unauthorized = || AppError::Unauthorized("Credenciais de cliente inválidas".to_string());

    let encoded = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .ok_or_else(unauthorized)?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(unauthorized)?;

    let (client_id, client_secret) = decoded.split_once(':').ok_or_else(unauthorized)?;

    if client_id != config.client_id || client_secret != config.client_secret {
        return Err(unauthorized());
    }

    Ok(())
}
