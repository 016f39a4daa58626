use serde_json::{Map, Value};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    products::repo_types::{Product, RESERVED_KEYS},
    state::AppState,
};

/// Accepts any JSON object that leaves the server-owned keys alone.
pub(crate) fn validate_document(payload: Value) -> AppResult<Map<String, Value>> {
    let Value::Object(doc) = payload else {
        return Err(AppError::Validation(
            "Product must be a JSON object".into(),
        ));
    };
    if let Some(key) = RESERVED_KEYS.iter().find(|k| doc.contains_key(**k)) {
        return Err(AppError::Validation(format!("Field `{key}` is reserved")));
    }
    Ok(doc)
}

pub async fn create_product(st: &AppState, payload: Value) -> AppResult<Product> {
    let doc = validate_document(payload)?;
    let product = st.products.create(doc).await?;
    info!(product_id = %product.id, "product created");
    Ok(product)
}

pub async fn list_products(st: &AppState) -> AppResult<Vec<Product>> {
    Ok(st.products.list().await?)
}
