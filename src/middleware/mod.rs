use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    models::UserRole,
    utils::jwt::{self, Claims},
};

fn authenticate(state: &AppState, req: &Request) -> Result<Claims, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Autenticação necessária".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Formato de token inválido".to_string()))?;

    jwt::verify_token(&state.auth, token.trim())
}

async fn authorize(
    state: &AppState,
    mut req: Request,
    next: Next,
    role: Option<UserRole>,
) -> Result<Response, AppError> {
    let claims = authenticate(state, &req)?;

    if let Some(role) = role {
        if !claims.has_role(role) {
            tracing::debug!("User {} lacks role {:?}", claims.username, role);
            return Err(AppError::Forbidden("Acesso negado".to_string()));
        }
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Any valid bearer token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, req, next, None).await
}

pub async fn admin_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, req, next, Some(UserRole::Admin)).await
}

pub async fn client_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, req, next, Some(UserRole::Client)).await
}
