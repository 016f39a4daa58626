use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Keys the server owns on every product document.
pub const RESERVED_KEYS: [&str; 2] = ["id", "createdAt"];

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub doc: Json<Map<String, Value>>,
    pub created_at: OffsetDateTime,
}

/// A stored product: the caller's document plus server-owned keys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at,
            fields: r.doc.0,
        }
    }
}
