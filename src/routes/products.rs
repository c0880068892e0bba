use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{Page, PageRequest, ProductDto, ProductMinDto, ProductQuery, ProductRequest, ProductSort},
    queries::{category_queries, product_queries},
    utils::extractors::{AppPath, AppQuery, ValidatedJson},
};

pub async fn find_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ProductDto>> {
    let product = product_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let categories = category_queries::get_product_categories(&state.db, id).await?;

    Ok(Json(ProductDto::new(product, categories)))
}

pub async fn find_all(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ProductQuery>,
) -> Result<Json<Page<ProductMinDto>>> {
    let page = PageRequest::new(params.page, params.size);
    let sort = ProductSort::parse(params.sort.as_deref());

    let products =
        product_queries::search_products(&state.db, params.name.as_deref(), &page, sort).await?;

    Ok(Json(products))
}

pub async fn insert(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<ProductDto>)> {
    ensure_categories_exist(&state, &payload).await?;

    let product = product_queries::create_product(&state.db, &payload).await?;
    let categories = category_queries::get_product_categories(&state.db, product.id).await?;

    tracing::info!("Product {} created", product.id);

    let location = format!("/products/{}", product.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProductDto::new(product, categories)),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> Result<Json<ProductDto>> {
    if !product_queries::exists(&state.db, id).await? {
        return Err(AppError::not_found());
    }

    ensure_categories_exist(&state, &payload).await?;

    let product = product_queries::update_product(&state.db, id, &payload)
        .await?
        .ok_or_else(AppError::not_found)?;
    let categories = category_queries::get_product_categories(&state.db, id).await?;

    Ok(Json(ProductDto::new(product, categories)))
}

pub async fn delete(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> Result<StatusCode> {
    if product_queries::delete_product(&state.db, id).await? == 0 {
        return Err(AppError::not_found());
    }

    tracing::info!("Product {} deleted", id);

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_categories_exist(state: &AppState, payload: &ProductRequest) -> Result<()> {
    let ids = payload.category_ids();
    let found = category_queries::find_by_ids(&state.db, &ids).await?;

    if found.len() != ids.len() {
        return Err(AppError::NotFound("Categoria não encontrada".to_string()));
    }

    Ok(())
}
