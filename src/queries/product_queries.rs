use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, Result},
    models::{
        Page, PageRequest, Product, ProductMinDto, ProductRequest, ProductSort, stored_price,
    },
};

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<HashMap<i64, Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

/// Escapes LIKE wildcards so the name filter is a plain substring match.
fn like_pattern(name: &str) -> String {
    let escaped = name
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_name_filter(query: &mut QueryBuilder<Postgres>, name: Option<&str>) {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        query.push(" WHERE name ILIKE ");
        query.push_bind(like_pattern(name));
    }
}

pub async fn search_products(
    pool: &PgPool,
    name: Option<&str>,
    page: &PageRequest,
    sort: ProductSort,
) -> Result<Page<ProductMinDto>> {
    let mut count_query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_name_filter(&mut count_query, name);

    let total: i64 = count_query
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT id, name, price, img_url FROM products");
    push_name_filter(&mut query, name);

    query.push(" ORDER BY ");
    query.push(sort.order_by());

    query.push(" LIMIT ");
    query.push_bind(page.size);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let products = query
        .build_query_as::<ProductMinDto>()
        .fetch_all(pool)
        .await?;

    Ok(Page::new(products, page, total))
}

pub async fn create_product(pool: &PgPool, req: &ProductRequest) -> Result<Product> {
    let mut tx = pool.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, price, img_url)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(stored_price(req.price))
    .bind(&req.img_url)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO product_categories (product_id, category_id)
         SELECT $1, unnest($2::bigint[])",
    )
    .bind(product.id)
    .bind(req.category_ids())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(product)
}

/// Replaces every field and the category set. Returns `None` if the product is gone.
pub async fn update_product(pool: &PgPool, id: i64, req: &ProductRequest) -> Result<Option<Product>> {
    let mut tx = pool.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET
            name = $1,
            description = $2,
            price = $3,
            img_url = $4
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(stored_price(req.price))
    .bind(&req.img_url)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(product) = product else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO product_categories (product_id, category_id)
         SELECT $1, unnest($2::bigint[])",
    )
    .bind(id)
    .bind(req.category_ids())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(product))
}

/// Deletes a product. Order items hold a restricting foreign key, so a product
/// that was ever ordered surfaces as `IntegrityViolation`.
pub async fn delete_product(pool: &PgPool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::IntegrityViolation("Falha de integridade referencial".to_string())
            }
            other => AppError::DatabaseError(other),
        })?;

    Ok(result.rows_affected())
}
