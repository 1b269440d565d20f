pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod state;

use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::models::{PRODUCT_LIST_ROUTE, PRODUCT_SHOW_ROUTE, USER_LIST_ROUTE, USER_SHOW_ROUTE};
use crate::pagination::RouteTable;
pub use crate::state::AppState;

/// Named routes used to render navigation links and `Location` headers
pub fn routes() -> RouteTable {
    RouteTable::new()
        .route(PRODUCT_LIST_ROUTE, "/api/products")
        .route(PRODUCT_SHOW_ROUTE, "/api/products/{id}")
        .route(USER_LIST_ROUTE, "/api/users")
        .route(USER_SHOW_ROUTE, "/api/users/{id}")
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .merge(public_routes())
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    if crate::is_development!() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/health", get(public::health))
        .route("/api/tokens", post(public::create_token))
}

fn api_routes() -> Router<AppState> {
    use handlers::protected::{products, users};

    Router::new()
        .route(
            "/api/products",
            get(products::list_products).layer(from_fn(middleware::http_cache_middleware)),
        )
        .route("/api/products/:id", get(products::show_product))
        .route(
            "/api/users",
            get(users::list_users)
                .layer(from_fn(middleware::http_cache_middleware))
                .post(users::create_user),
        )
        .route(
            "/api/users/:id",
            get(users::show_user)
                .put(users::put_user)
                .patch(users::patch_user)
                .delete(users::delete_user),
        )
        .route_layer(from_fn(middleware::jwt_auth_middleware))
}
