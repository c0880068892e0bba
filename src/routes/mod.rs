mod categories;
mod health;
mod login;
mod orders;
mod products;
mod users;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    middleware::{admin_middleware, auth_middleware, client_middleware},
};

pub fn create_router(state: &AppState) -> Router<AppState> {
    let authenticated = middleware::from_fn_with_state(state.clone(), auth_middleware);
    let admin_only = middleware::from_fn_with_state(state.clone(), admin_middleware);
    let client_only = middleware::from_fn_with_state(state.clone(), client_middleware);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/oauth2/token", post(login::issue_token))
        .route("/categories", get(categories::find_all))
        .route(
            "/products",
            get(products::find_all).merge(post(products::insert).route_layer(admin_only.clone())),
        )
        .route(
            "/products/{id}",
            get(products::find_by_id).merge(
                put(products::update)
                    .delete(products::delete)
                    .route_layer(admin_only),
            ),
        )
        .route(
            "/orders",
            post(orders::insert).route_layer(client_only),
        )
        .route(
            "/orders/{id}",
            get(orders::find_by_id).route_layer(authenticated.clone()),
        )
        .route("/users/me", get(users::get_me).route_layer(authenticated))
}
