use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{unique_key_values, Document, Store, StoreError, Write};
use crate::filter::{matcher, FilterData};
use crate::types::Collection;

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    doc: Document,
}

type Table = BTreeMap<Uuid, Entry>;

#[derive(Default)]
struct Inner {
    tables: HashMap<Collection, Table>,
    counters: HashMap<String, i64>,
    inserted: u64,
}

/// In-process store used by tests and when no DATABASE_URL is configured.
/// A batch is applied to copies of the touched tables and swapped in only on success.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tables
            .get(&collection)
            .and_then(|table| table.get(&id))
            .map(|entry| entry.doc.clone()))
    }

    async fn find(&self, collection: Collection, filter: &FilterData) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&Entry> = inner
            .tables
            .get(&collection)
            .map(|table| table.values().collect())
            .unwrap_or_default();
        entries.sort_by_key(|entry| entry.seq);
        let docs = entries.into_iter().map(|entry| entry.doc.clone()).collect();
        Ok(matcher::select(docs, filter))
    }

    async fn count(&self, collection: Collection, filter: &FilterData) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        let count = inner
            .tables
            .get(&collection)
            .map(|table| {
                table
                    .values()
                    .filter(|entry| matcher::matches(&entry.doc, &filter.clauses))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn apply(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        let mut staged: HashMap<Collection, Table> = HashMap::new();
        for write in &writes {
            let collection = write.collection();
            staged
                .entry(collection)
                .or_insert_with(|| inner.tables.get(&collection).cloned().unwrap_or_default());
        }

        let mut inserted = inner.inserted;
        for write in writes {
            apply_one(&mut staged, write, &mut inserted)?;
        }

        inner.inserted = inserted;
        inner.tables.extend(staged);
        Ok(())
    }

    async fn next_sequence(&self, key: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let seq = inner.counters.entry(key.to_string()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn apply_one(staged: &mut HashMap<Collection, Table>, write: Write, inserted: &mut u64) -> Result<(), StoreError> {
    let collection = write.collection();
    let table = staged
        .get_mut(&collection)
        .ok_or_else(|| StoreError::Malformed(format!("table {} was not staged", collection)))?;

    match write {
        Write::Insert { id, doc, .. } => {
            check_unique(collection, table, id, &doc)?;
            *inserted += 1;
            table.insert(id, Entry { seq: *inserted, doc });
        }
        Write::Replace { id, doc, .. } => {
            check_unique(collection, table, id, &doc)?;
            let entry = table
                .get_mut(&id)
                .ok_or(StoreError::NotFound { collection, id })?;
            entry.doc = doc;
        }
        Write::Delete { id, .. } => {
            table.remove(&id).ok_or(StoreError::NotFound { collection, id })?;
        }
        Write::AddToSet { ids, field, value, .. } => {
            let value = Value::String(value.to_string());
            for id in ids {
                if let Some(entry) = table.get_mut(&id) {
                    let list = entry
                        .doc
                        .entry(field.to_string())
                        .or_insert_with(|| Value::Array(vec![]));
                    if !list.is_array() {
                        *list = Value::Array(vec![]);
                    }
                    if let Value::Array(items) = list {
                        if !items.contains(&value) {
                            items.push(value.clone());
                        }
                    }
                }
            }
        }
        Write::Pull { ids, field, value, .. } => {
            let value = Value::String(value.to_string());
            for (id, entry) in table.iter_mut() {
                if let Some(ids) = &ids {
                    if !ids.contains(id) {
                        continue;
                    }
                }
                if let Some(Value::Array(items)) = entry.doc.get_mut(field) {
                    items.retain(|item| item != &value);
                }
            }
        }
    }
    Ok(())
}

fn check_unique(collection: Collection, table: &Table, id: Uuid, doc: &Document) -> Result<(), StoreError> {
    for fields in collection.unique_keys() {
        let Some(key) = unique_key_values(doc, fields) else {
            continue;
        };
        let collides = table
            .iter()
            .filter(|(other_id, _)| **other_id != id)
            .any(|(_, entry)| unique_key_values(&entry.doc, fields).as_ref() == Some(&key));
        if collides {
            return Err(StoreError::UniqueViolation {
                collection,
                fields: fields.iter().map(|f| f.to_string()).collect(),
            });
        }
    }
    Ok(())
}
