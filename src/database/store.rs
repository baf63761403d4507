use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::FilterData;
use crate::types::Collection;

/// A stored document. Always carries its primary key under `_id`.
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} with the same {} already exists", fields.join(", "))]
    UniqueViolation {
        collection: Collection,
        fields: Vec<String>,
    },

    #[error("Record {id} not found in {collection}")]
    NotFound { collection: Collection, id: Uuid },

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One step of an atomic write batch
#[derive(Debug, Clone)]
pub enum Write {
    Insert {
        collection: Collection,
        id: Uuid,
        doc: Document,
    },
    Replace {
        collection: Collection,
        id: Uuid,
        doc: Document,
    },
    Delete {
        collection: Collection,
        id: Uuid,
    },
    /// Append `value` to the array `field` of each listed document unless already present
    AddToSet {
        collection: Collection,
        ids: Vec<Uuid>,
        field: &'static str,
        value: Uuid,
    },
    /// Remove `value` from the array `field`; `ids: None` targets every document containing it
    Pull {
        collection: Collection,
        ids: Option<Vec<Uuid>>,
        field: &'static str,
        value: Uuid,
    },
}

impl Write {
    pub fn collection(&self) -> Collection {
        match self {
            Write::Insert { collection, .. }
            | Write::Replace { collection, .. }
            | Write::Delete { collection, .. }
            | Write::AddToSet { collection, .. }
            | Write::Pull { collection, .. } => *collection,
        }
    }
}

/// Persistence seam shared by the PostgreSQL and in-memory backends.
///
/// Unique keys from [`Collection::unique_keys`] are enforced by the backend and
/// reported as [`StoreError::UniqueViolation`]. A batch passed to [`Store::apply`]
/// is all-or-nothing.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: Collection, filter: &FilterData) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: Collection, filter: &FilterData) -> Result<u64, StoreError>;

    async fn apply(&self, writes: Vec<Write>) -> Result<(), StoreError>;

    /// Atomically increment the named counter (created at 0 when absent) and return the new value
    async fn next_sequence(&self, key: &str) -> Result<i64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_by_ids(&self, collection: Collection, ids: &[Uuid]) -> Result<Vec<Document>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = FilterData::new().where_ids(ids.iter().copied());
        self.find(collection, &filter).await
    }

    async fn insert(&self, collection: Collection, id: Uuid, doc: Document) -> Result<(), StoreError> {
        self.apply(vec![Write::Insert { collection, id, doc }]).await
    }
}

/// Primary key of a stored document
pub fn document_id(doc: &Document) -> Option<Uuid> {
    doc.get("_id").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

/// Parse a reference field holding a single id
pub fn reference(doc: &Document, field: &str) -> Option<Uuid> {
    crate::filter::matcher::lookup(doc, field)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Parse a reference field holding a list of ids; malformed entries are skipped
pub fn references(doc: &Document, field: &str) -> Vec<Uuid> {
    match crate::filter::matcher::lookup(doc, field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect(),
        _ => vec![],
    }
}

/// Values of a unique key, or None when any part is missing (missing parts never collide)
pub fn unique_key_values(doc: &Document, fields: &[&str]) -> Option<Vec<Value>> {
    fields
        .iter()
        .map(|field| doc.get(*field).filter(|v| !v.is_null()).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ids_and_references() {
        let id = Uuid::new_v4();
        let member = Uuid::new_v4();
        let doc = json!({
            "_id": id.to_string(),
            "localChurch": member.to_string(),
            "members": [member.to_string(), "not-a-uuid"]
        })
        .as_object()
        .cloned()
        .unwrap();

        assert_eq!(document_id(&doc), Some(id));
        assert_eq!(reference(&doc, "localChurch"), Some(member));
        assert_eq!(references(&doc, "members"), vec![member]);
        assert!(references(&doc, "missing").is_empty());
    }

    #[test]
    fn unique_key_requires_every_part() {
        let doc = json!({"name": "Metro", "episcopalArea": "bea", "other": null})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(
            unique_key_values(&doc, &["name", "episcopalArea"]),
            Some(vec![json!("Metro"), json!("bea")])
        );
        assert_eq!(unique_key_values(&doc, &["name", "other"]), None);
    }
}
