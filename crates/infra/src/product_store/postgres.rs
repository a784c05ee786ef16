//! Postgres-backed product store.
//!
//! Products live in a single `products` table. `images` is kept as `JSONB`
//! so rows written by older clients as a bare string still load (they are
//! read back through `images_from_document`).
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | ProductStoreError |
//! |------------|----------------------|-------------------|
//! | Database (unique violation) on insert | `23505` | `DuplicateId` |
//! | Column decode / out-of-range values | N/A | `Decode` |
//! | Anything else (pool closed, IO, other codes) | Any | `Backend` |

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use catalog_core::ProductId;
use catalog_products::{images_from_document, Product};

use super::query::{ProductFilter, Window};
use super::r#trait::{ProductStore, ProductStoreError, StoredProduct};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          BIGINT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price       NUMERIC(12,2) NOT NULL CHECK (price >= 0),
    bulk_price  NUMERIC(12,2) NOT NULL CHECK (bulk_price >= 0),
    bulk_qty    BIGINT NOT NULL CHECK (bulk_qty >= 1),
    category    TEXT NOT NULL,
    in_stock    BOOLEAN NOT NULL DEFAULT TRUE,
    images      JSONB NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    revision    BIGINT NOT NULL DEFAULT 0
)
"#;

const CREATE_CATEGORY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS products_category_idx ON products (category)";

const COLUMNS: &str = "id, name, description, price, bulk_price, bulk_qty, category, \
                       in_stock, images, created_at, updated_at, revision";

// $1 = category (exact), $2 = escaped ILIKE pattern for name OR description.
const FILTER: &str = "($1::text IS NULL OR category = $1) \
                      AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)";

/// Postgres-backed product collection.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shared by every
/// request. The `id` primary key is the uniqueness guard for concurrent
/// creators.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, ProductStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table and its indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), ProductStoreError> {
        for statement in [CREATE_TABLE, CREATE_CATEGORY_INDEX] {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), err)]
    async fn find(
        &self,
        filter: &ProductFilter,
        window: Window,
    ) -> Result<Vec<StoredProduct>, ProductStoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM products WHERE {FILTER} ORDER BY id ASC OFFSET $3 LIMIT $4"
        );
        let skip = i64::try_from(window.skip).unwrap_or(i64::MAX);

        let rows = sqlx::query(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(skip)
            .bind(i64::from(window.limit))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        rows.iter().map(decode_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductStoreError> {
        let sql = format!("SELECT COUNT(*) AS total FROM products WHERE {FILTER}");

        let row = sqlx::query(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.search.as_deref().map(like_pattern))
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        let total: i64 = row.try_get("total").map_err(decode_error)?;
        u64::try_from(total).map_err(|e| ProductStoreError::Decode(e.to_string()))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, ProductStoreError> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE id = $1");

        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert(&self, product: Product) -> Result<StoredProduct, ProductStoreError> {
        let sql = format!(
            r#"
            INSERT INTO products (
                id, name, description, price, bulk_price, bulk_qty, category, in_stock, images
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        );

        let row = bind_product(sqlx::query(&sql), &product)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    ProductStoreError::DuplicateId(product.id)
                }
                other => map_sqlx_error("insert", other),
            })?;

        decode_row(&row)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update(&self, product: Product) -> Result<Option<StoredProduct>, ProductStoreError> {
        let sql = format!(
            r#"
            UPDATE products SET
                name = $2,
                description = $3,
                price = $4,
                bulk_price = $5,
                bulk_qty = $6,
                category = $7,
                in_stock = $8,
                images = $9,
                updated_at = NOW(),
                revision = revision + 1
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let row = bind_product(sqlx::query(&sql), &product)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, ProductStoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.value())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

/// Binds `$1..=$9` in table column order.
fn bind_product<'q>(query: PgQuery<'q>, product: &'q Product) -> PgQuery<'q> {
    query
        .bind(product.id.value())
        .bind(product.name.as_str())
        .bind(product.description.as_str())
        .bind(product.price)
        .bind(product.bulk_price)
        .bind(i64::from(product.bulk_qty))
        .bind(product.category.as_str())
        .bind(product.in_stock)
        .bind(Json(&product.images))
}

fn decode_row(row: &PgRow) -> Result<StoredProduct, ProductStoreError> {
    let id: i64 = row.try_get("id").map_err(decode_error)?;
    let bulk_qty: i64 = row.try_get("bulk_qty").map_err(decode_error)?;
    let revision: i64 = row.try_get("revision").map_err(decode_error)?;
    let images: serde_json::Value = row.try_get("images").map_err(decode_error)?;

    let product = Product {
        id: ProductId::new(id).map_err(|e| ProductStoreError::Decode(e.to_string()))?,
        name: row.try_get("name").map_err(decode_error)?,
        description: row.try_get("description").map_err(decode_error)?,
        price: row.try_get::<Decimal, _>("price").map_err(decode_error)?,
        bulk_price: row.try_get::<Decimal, _>("bulk_price").map_err(decode_error)?,
        bulk_qty: u32::try_from(bulk_qty).map_err(|e| ProductStoreError::Decode(e.to_string()))?,
        category: row.try_get("category").map_err(decode_error)?,
        in_stock: row.try_get("in_stock").map_err(decode_error)?,
        images: images_from_document(&images),
    };

    Ok(StoredProduct {
        product,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
        revision: u64::try_from(revision).map_err(|e| ProductStoreError::Decode(e.to_string()))?,
    })
}

/// `%needle%` with the ILIKE metacharacters escaped, so search stays literal.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn decode_error(err: sqlx::Error) -> ProductStoreError {
    ProductStoreError::Decode(err.to_string())
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> ProductStoreError {
    tracing::error!(operation, error = %err, "product store query failed");
    ProductStoreError::Backend(format!("{operation}: {err}"))
}
