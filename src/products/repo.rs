use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::products::repo_types::{Product, ProductRow};

/// Product store. Documents are kept as-is.
#[async_trait]
pub trait ProductRepo: Send + Sync {
    async fn create(&self, doc: Map<String, Value>) -> anyhow::Result<Product>;

    /// Every product, in insertion order.
    async fn list(&self) -> anyhow::Result<Vec<Product>>;
}

#[derive(Clone)]
pub struct PgProductRepo {
    db: PgPool,
}

impl PgProductRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepo for PgProductRepo {
    async fn create(&self, doc: Map<String, Value>) -> anyhow::Result<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, doc)
            VALUES ($1, $2)
            RETURNING id, doc, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Json(doc))
        .fetch_one(&self.db)
        .await
        .context("insert product")?;
        Ok(row.into())
    }

    async fn list(&self) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, doc, created_at
              FROM products
             ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list products")?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}
