use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::manager::unique_index_name;
use super::store::{Document, Store, StoreError, Write};
use crate::filter::types::{SqlParam, SqlResult};
use crate::filter::FilterData;
use crate::types::Collection;

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// PostgreSQL backend: one JSONB document table per collection
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn bind_param<'q>(q: PgQuery<'q>, param: &'q SqlParam) -> PgQuery<'q> {
    match param {
        SqlParam::Path(path) => q.bind(path),
        SqlParam::Json(value) => q.bind(value),
        SqlParam::Text(text) => q.bind(text),
        SqlParam::Int(n) => q.bind(*n),
    }
}

fn build_query(sql: &SqlResult) -> PgQuery<'_> {
    let mut q = sqlx::query(&sql.query);
    for param in &sql.params {
        q = bind_param(q, param);
    }
    q
}

fn row_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    match row.try_get::<Value, _>("doc")? {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::Malformed(format!("expected an object, found {}", other))),
    }
}

/// Map a unique-index violation back to the key it protects
fn translate(collection: Collection, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let fields = db_err
                .constraint()
                .and_then(|name| {
                    collection
                        .unique_keys()
                        .iter()
                        .enumerate()
                        .find(|(i, _)| unique_index_name(collection, *i) == name)
                        .map(|(_, fields)| fields.iter().map(|f| f.to_string()).collect())
                })
                .unwrap_or_default();
            return StoreError::UniqueViolation { collection, fields };
        }
    }
    StoreError::Sqlx(err)
}

async fn execute_write(tx: &mut Transaction<'_, Postgres>, write: Write) -> Result<(), StoreError> {
    let collection = write.collection();
    let table = collection.name();

    match write {
        Write::Insert { id, doc, .. } => {
            sqlx::query(&format!("INSERT INTO \"{}\" (id, doc) VALUES ($1, $2)", table))
                .bind(id)
                .bind(Value::Object(doc))
                .execute(&mut **tx)
                .await
                .map_err(|e| translate(collection, e))?;
        }
        Write::Replace { id, doc, .. } => {
            let result = sqlx::query(&format!(
                "UPDATE \"{}\" SET doc = $2, updated_at = now() WHERE id = $1",
                table
            ))
            .bind(id)
            .bind(Value::Object(doc))
            .execute(&mut **tx)
            .await
            .map_err(|e| translate(collection, e))?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound { collection, id });
            }
        }
        Write::Delete { id, .. } => {
            let result = sqlx::query(&format!("DELETE FROM \"{}\" WHERE id = $1", table))
                .bind(id)
                .execute(&mut **tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound { collection, id });
            }
        }
        Write::AddToSet { ids, field, value, .. } => {
            if ids.is_empty() {
                return Ok(());
            }
            sqlx::query(&format!(
                "UPDATE \"{}\" SET doc = jsonb_set(doc, ARRAY[$1::text], \
                 COALESCE(doc -> $1::text, '[]'::jsonb) || jsonb_build_array($2::text)), updated_at = now() \
                 WHERE id = ANY($3) AND NOT (COALESCE(doc -> $1::text, '[]'::jsonb) @> jsonb_build_array($2::text))",
                table
            ))
            .bind(field)
            .bind(value.to_string())
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        }
        Write::Pull { ids, field, value, .. } => {
            let mut query = format!(
                "UPDATE \"{}\" SET doc = jsonb_set(doc, ARRAY[$1::text], COALESCE(\
                 (SELECT jsonb_agg(e) FROM jsonb_array_elements(doc -> $1::text) e WHERE e <> to_jsonb($2::text)), \
                 '[]'::jsonb)), updated_at = now() \
                 WHERE jsonb_typeof(doc -> $1::text) = 'array' AND (doc -> $1::text) @> jsonb_build_array($2::text)",
                table
            );
            if ids.is_some() {
                query.push_str(" AND id = ANY($3)");
            }
            let mut q = sqlx::query(&query).bind(field).bind(value.to_string());
            if let Some(ids) = ids {
                q = q.bind(ids);
            }
            q.execute(&mut **tx).await?;
        }
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(&format!("SELECT doc FROM \"{}\" WHERE id = $1", collection.name()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_document).transpose()
    }

    async fn find(&self, collection: Collection, filter: &FilterData) -> Result<Vec<Document>, StoreError> {
        let sql = filter.to_sql(collection.name());
        let rows = build_query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_document).collect()
    }

    async fn count(&self, collection: Collection, filter: &FilterData) -> Result<u64, StoreError> {
        let sql = filter.without_paging().to_count_sql(collection.name());
        let row = build_query(&sql).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn apply(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for write in writes {
            execute_write(&mut tx, write).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn next_sequence(&self, key: &str) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "INSERT INTO counters (key, seq) VALUES ($1, 1) \
             ON CONFLICT (key) DO UPDATE SET seq = counters.seq + 1 RETURNING seq",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("seq")?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
