//! PostgreSQL-backed option store.
//!
//! Reads a settings table shaped like `(option_name TEXT, option_value TEXT)`.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{PgPool, Row};

use crate::error::CacheResult;
use crate::traits::KeyValueSource;

/// The default settings table name
pub const DEFAULT_OPTIONS_TABLE: &str = "options";

/// Escapes `%`, `_` and `\` so `prefix` matches literally in a `LIKE` pattern.
pub fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A [`KeyValueSource`] over a PostgreSQL settings table.
#[derive(Debug, Clone)]
pub struct PgOptionsStore {
    pool: PgPool,
    table: String,
}

impl PgOptionsStore {
    /// Create a store over the default table
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, DEFAULT_OPTIONS_TABLE.to_string())
    }

    /// Create a store over a custom table. The name is used verbatim in SQL.
    pub fn with_table(pool: PgPool, table: String) -> Self {
        Self { pool, table }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn fetch_rows(&self, sql: &str, pattern: Option<String>) -> CacheResult<Vec<(String, String)>> {
        let mut query = sqlx::query(sql);
        if let Some(pattern) = pattern {
            query = query.bind(pattern);
        }
        let mut rows = query.fetch(&self.pool);
        let mut options = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let name: String = row.try_get("option_name")?;
            let value: Option<String> = row.try_get("option_value")?;
            options.push((name, value.unwrap_or_default()));
        }
        Ok(options)
    }
}

#[async_trait]
impl KeyValueSource for PgOptionsStore {
    async fn query_by_prefix(&self, prefix: &str) -> CacheResult<Vec<(String, String)>> {
        let sql = format!(
            "SELECT option_name, option_value FROM {} WHERE option_name LIKE $1 ORDER BY option_name",
            self.table
        );
        self.fetch_rows(&sql, Some(format!("{}%", escape_like(prefix)))).await
    }

    async fn query_all(&self) -> CacheResult<Vec<(String, String)>> {
        let sql = format!(
            "SELECT option_name, option_value FROM {} ORDER BY option_name",
            self.table
        );
        self.fetch_rows(&sql, None).await
    }

    async fn get_single(&self, key: &str) -> CacheResult<Option<String>> {
        let sql = format!(
            "SELECT option_value FROM {} WHERE option_name = $1",
            self.table
        );
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(row.try_get::<Option<String>, _>("option_value")?),
            None => Ok(None),
        }
    }
}
