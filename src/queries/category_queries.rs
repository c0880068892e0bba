use sqlx::PgPool;

use crate::{error::Result, models::Category};

pub async fn get_all(pool: &PgPool) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(categories)
}

pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name FROM categories WHERE id = ANY($1) ORDER BY id",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Get categories for a specific product
pub async fn get_product_categories(pool: &PgPool, product_id: i64) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT c.id, c.name FROM categories c
         INNER JOIN product_categories pc ON c.id = pc.category_id
         WHERE pc.product_id = $1
         ORDER BY c.id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}
