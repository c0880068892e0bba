use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::UserDto,
    queries::user_queries,
    utils::{extractors::extract_user_id, jwt::Claims},
};

pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserDto>> {
    let user_id = extract_user_id(&claims)?;

    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let roles = user_queries::get_roles(&state.db, user.id).await?;

    Ok(Json(UserDto::new(user, roles)))
}
