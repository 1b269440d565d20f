// handlers/protected/products.rs - product catalogue

use axum::{
    extract::{Path, RawQuery, State},
    response::IntoResponse,
    Json,
};

use crate::error::ApiError;
use crate::handlers::location;
use crate::models::{Entity, Product, ProductView, PRODUCT_LIST_ROUTE, PRODUCT_SHOW_ROUTE};
use crate::pagination::Page;
use crate::state::AppState;

/// GET /api/products - paginated catalogue
pub async fn list_products(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Page<ProductView>>, ApiError> {
    let source = state.products.list_source().await;
    let page = state
        .pagination
        .create_collection(source.as_ref(), query.as_deref(), PRODUCT_LIST_ROUTE, &Product::METADATA)
        .await?;

    let urls = state.urls.as_ref();
    Ok(Json(page.map(|product| ProductView::new(product, urls))))
}

/// GET /api/products/:id
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .products
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product {} not found", id)))?;

    let location = location(state.urls.as_ref(), PRODUCT_SHOW_ROUTE, product.id)?;
    Ok(([location], Json(ProductView::new(product, state.urls.as_ref()))))
}
