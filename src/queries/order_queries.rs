use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Order, OrderItem, OrderLine, OrderStatus},
};

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT o.id, o.moment, o.status, o.client_id, u.name AS client_name,
                p.moment AS payment_moment
         FROM orders o
         INNER JOIN users u ON u.id = o.client_id
         LEFT JOIN payments p ON p.order_id = o.id
         WHERE o.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(order)
}

pub async fn get_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT oi.product_id, p.name, oi.price, oi.quantity, p.img_url
         FROM order_items oi
         INNER JOIN products p ON p.id = oi.product_id
         WHERE oi.order_id = $1
         ORDER BY oi.product_id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Inserts a WAITING_PAYMENT order and its items in one transaction; returns the order id.
pub async fn create_order_with_items(
    pool: &PgPool,
    client_id: i64,
    lines: &[OrderLine],
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (moment, status, client_id)
         VALUES (NOW(), $1, $2)
         RETURNING id",
    )
    .bind(OrderStatus::WaitingPayment)
    .bind(client_id)
    .fetch_one(&mut *tx)
    .await?;

    let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
    let quantities: Vec<i32> = lines.iter().map(|l| l.quantity).collect();
    let prices: Vec<Decimal> = lines.iter().map(|l| l.price).collect();

    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantity, price)
         SELECT $1, unnest($2::bigint[]), unnest($3::int[]), unnest($4::numeric[])",
    )
    .bind(order_id)
    .bind(&product_ids)
    .bind(&quantities)
    .bind(&prices)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(order_id)
}
