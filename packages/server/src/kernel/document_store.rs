//! Document store backends for production and testing.
//!
//! The Postgres backend keeps every logical table in one `documents`
//! relation keyed by (tbl, pk, sk) with the record itself as jsonb, so the
//! store stays schema-free the way the domain layer expects. The in-memory
//! backend mirrors the same semantics for tests.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::{BaseDocumentStore, DocKey, ScanFilter};

// Missing sort keys are stored as the empty string so (tbl, pk, sk) can be
// the primary key.
fn sort_component(key: &DocKey) -> &str {
    key.sort.as_deref().unwrap_or("")
}

fn filter_matches(doc: &Value, filter: &ScanFilter) -> bool {
    doc.get(&filter.field) == Some(&filter.equals)
}

/// Postgres-backed document store.
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseDocumentStore for PostgresDocumentStore {
    async fn get(&self, table: &str, key: &DocKey) -> Result<Option<Value>> {
        sqlx::query_scalar::<_, Value>(
            "SELECT doc FROM documents WHERE tbl = $1 AND pk = $2 AND sk = $3",
        )
        .bind(table)
        .bind(&key.partition)
        .bind(sort_component(key))
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to read document from {}", table))
    }

    async fn put(&self, table: &str, key: &DocKey, doc: Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO documents (tbl, pk, sk, doc)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (tbl, pk, sk) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(table)
        .bind(&key.partition)
        .bind(sort_component(key))
        .bind(doc)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write document to {}", table))?;
        Ok(())
    }

    async fn scan(&self, table: &str, filter: Option<&ScanFilter>) -> Result<Vec<Value>> {
        // Unindexed full-table scan with an equality predicate, expressed
        // as jsonb containment.
        let docs = match filter {
            Some(filter) => {
                let mut predicate = Map::new();
                predicate.insert(filter.field.clone(), filter.equals.clone());
                sqlx::query_scalar::<_, Value>(
                    "SELECT doc FROM documents WHERE tbl = $1 AND doc @> $2",
                )
                .bind(table)
                .bind(Value::Object(predicate))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, Value>("SELECT doc FROM documents WHERE tbl = $1")
                    .bind(table)
                    .fetch_all(&self.pool)
                    .await
            }
        };
        docs.with_context(|| format!("failed to scan {}", table))
    }

    async fn update(
        &self,
        table: &str,
        key: &DocKey,
        attrs: Map<String, Value>,
    ) -> Result<Value> {
        let updated = sqlx::query_scalar::<_, Value>(
            "UPDATE documents SET doc = doc || $4
             WHERE tbl = $1 AND pk = $2 AND sk = $3
             RETURNING doc",
        )
        .bind(table)
        .bind(&key.partition)
        .bind(sort_component(key))
        .bind(Value::Object(attrs))
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update document in {}", table))?;

        match updated {
            Some(doc) => Ok(doc),
            None => bail!("document not found in {}", table),
        }
    }

    async fn delete(&self, table: &str, key: &DocKey) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE tbl = $1 AND pk = $2 AND sk = $3")
            .bind(table)
            .bind(&key.partition)
            .bind(sort_component(key))
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete document from {}", table))?;
        Ok(())
    }
}

/// In-memory document store with the same merge-write semantics.
///
/// Used by tests to inspect persisted state without a database.
#[derive(Default)]
pub struct MemoryDocumentStore {
    tables: RwLock<HashMap<String, HashMap<(String, String), Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_key(key: &DocKey) -> (String, String) {
        (key.partition.clone(), sort_component(key).to_string())
    }

    /// Number of documents in a logical table.
    pub fn doc_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .map(|t| t.len())
            .or(Some(0))
            .unwrap_or(0)
    }

    /// Snapshot of all documents in a logical table.
    pub fn docs(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BaseDocumentStore for MemoryDocumentStore {
    async fn get(&self, table: &str, key: &DocKey) -> Result<Option<Value>> {
        Ok(self
            .tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .and_then(|t| t.get(&Self::entry_key(key)))
            .cloned())
    }

    async fn put(&self, table: &str, key: &DocKey, doc: Value) -> Result<()> {
        self.tables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(table.to_string())
            .or_default()
            .insert(Self::entry_key(key), doc);
        Ok(())
    }

    async fn scan(&self, table: &str, filter: Option<&ScanFilter>) -> Result<Vec<Value>> {
        Ok(self
            .tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .map(|t| {
                t.values()
                    .filter(|doc| filter.map_or(true, |f| filter_matches(doc, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(
        &self,
        table: &str,
        key: &DocKey,
        attrs: Map<String, Value>,
    ) -> Result<Value> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let doc = tables
            .get_mut(table)
            .and_then(|t| t.get_mut(&Self::entry_key(key)));

        match doc {
            Some(Value::Object(existing)) => {
                for (k, v) in attrs {
                    existing.insert(k, v);
                }
                Ok(Value::Object(existing.clone()))
            }
            Some(_) => bail!("document in {} is not an object", table),
            None => bail!("document not found in {}", table),
        }
    }

    async fn delete(&self, table: &str, key: &DocKey) -> Result<()> {
        if let Some(t) = self
            .tables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(table)
        {
            t.remove(&Self::entry_key(key));
        }
        Ok(())
    }
}
