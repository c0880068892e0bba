use sqlx::PgPool;

use crate::{
    error::Result,
    models::{User, UserRole},
};

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_roles(pool: &PgPool, user_id: i64) -> Result<Vec<UserRole>> {
    let roles = sqlx::query_scalar::<_, UserRole>(
        "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(roles)
}
