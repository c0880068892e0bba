use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{OrderDto, OrderLine, OrderRequest},
    queries::{order_queries, product_queries},
    utils::extractors::{AppPath, ValidatedJson, extract_user_id, validate_self_or_admin},
    utils::jwt::Claims,
};

pub async fn find_by_id(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<OrderDto>> {
    let order = order_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(AppError::not_found)?;

    validate_self_or_admin(&claims, order.client_id)?;

    let items = order_queries::get_items(&state.db, order.id).await?;

    Ok(Json(OrderDto::new(order, items)))
}

pub async fn insert(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderDto>)> {
    let client_id = extract_user_id(&claims)?;

    let requested = payload.merged_items();
    let product_ids: Vec<i64> = requested.iter().map(|(id, _)| *id).collect();
    let products = product_queries::find_by_ids(&state.db, &product_ids).await?;

    let mut lines = Vec::with_capacity(requested.len());
    for (product_id, quantity) in requested {
        let product = products.get(&product_id).ok_or_else(|| {
            AppError::NotFound(format!("Produto {} não encontrado", product_id))
        })?;

        lines.push(OrderLine {
            product_id,
            quantity,
            price: product.price,
        });
    }

    let order_id = order_queries::create_order_with_items(&state.db, client_id, &lines).await?;

    tracing::info!("Order {} created for client {}", order_id, client_id);

    let order = order_queries::find_by_id(&state.db, order_id)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Order {} vanished after insert", order_id)))?;
    let items = order_queries::get_items(&state.db, order_id).await?;

    Ok((StatusCode::CREATED, Json(OrderDto::new(order, items))))
}
