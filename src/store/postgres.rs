use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{Document, RecordFilter};
use crate::store::traits::RecordStore;

/// Record store keeping every collection in one JSONB document table
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the document table if it does not exist yet
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create records table")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresStore {
    async fn list_records(
        &self,
        collection: &str,
        filter: Option<&RecordFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        // LIMIT NULL means no limit; a NULL filter value disables the filter
        let rows = sqlx::query(
            r#"
            SELECT id, data FROM records
            WHERE collection = $1
              AND ($2::text IS NULL OR data->>$3::text = $2::text)
            ORDER BY id
            LIMIT $4::bigint
            "#,
        )
        .bind(collection)
        .bind(filter.map(|f| f.value.as_str()))
        .bind(filter.map(|f| f.field.as_str()))
        .bind(limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX)))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to list records in {}", collection))?;

        rows.into_iter()
            .map(|row| -> Result<Document> {
                Ok(Document {
                    id: row.try_get("id")?,
                    data: row.try_get("data")?,
                })
            })
            .collect()
    }

    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT id, data FROM records WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch record {}/{}", collection, id))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Document {
            id: row.try_get("id")?,
            data: row.try_get("data")?,
        }))
    }

    async fn upsert_record(&self, collection: &str, document: Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO records (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(&document.id)
        .bind(&document.data)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert record {}/{}", collection, document.id))?;

        Ok(())
    }
}
