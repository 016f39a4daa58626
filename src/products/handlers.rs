use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde_json::Value;
use tracing::instrument;

use crate::{
    auth::extractors::AdminUser,
    error::AppResult,
    extract::Json,
    products::{repo_types::Product, services},
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new().route("/products", get(list_products).post(create_product))
}

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(services::list_products(&state).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = services::create_product(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}
