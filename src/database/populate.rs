//! Reference expansion for read responses.
//!
//! Every reference field is replaced by a `{_id, customId, <display>}` summary of
//! the target document. Targets are fetched with one query per target collection
//! regardless of the number of documents being expanded.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use uuid::Uuid;

use super::store::{document_id, Document, Store, StoreError};
use crate::models::council::ROSTER;
use crate::types::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    Many,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefField {
    pub path: String,
    pub target: Collection,
    pub arity: Arity,
}

impl RefField {
    fn one(path: impl Into<String>, target: Collection) -> Self {
        Self { path: path.into(), target, arity: Arity::One }
    }

    fn many(path: impl Into<String>, target: Collection) -> Self {
        Self { path: path.into(), target, arity: Arity::Many }
    }
}

/// Reference fields expanded on reads, per collection
pub fn reference_fields(collection: Collection) -> Vec<RefField> {
    use Collection::*;
    match collection {
        AnnualConferences => vec![],
        Districts => vec![RefField::one("annualConference", AnnualConferences)],
        LocalChurches => vec![RefField::one("district", Districts)],
        Memberships => vec![
            RefField::one("localChurch", LocalChurches),
            RefField::one("father", Memberships),
            RefField::one("mother", Memberships),
            RefField::one("spouse", Memberships),
            RefField::many("children", Memberships),
            RefField::many("ministries", Ministries),
        ],
        Ministries => vec![
            RefField::one("localChurch", LocalChurches),
            RefField::many("members", Memberships),
        ],
        Families => vec![
            RefField::one("localChurch", LocalChurches),
            RefField::one("father", Memberships),
            RefField::one("mother", Memberships),
            RefField::many("children", Memberships),
        ],
        Councils => {
            let mut fields = vec![RefField::one("localChurch", LocalChurches)];
            for committee in ROSTER {
                for slot in committee.slots {
                    fields.push(RefField::one(format!("{}.{}", committee.name, slot), Memberships));
                }
                for list in committee.lists {
                    fields.push(RefField::many(format!("{}.{}", committee.name, list), Memberships));
                }
            }
            fields
        }
        Attendances | Histories => vec![RefField::one("localChurch", LocalChurches)],
        Users => vec![
            RefField::one("annual", AnnualConferences),
            RefField::one("district", Districts),
            RefField::one("localChurch", LocalChurches),
        ],
        Logs => vec![RefField::one("performedBy", Users)],
    }
}

fn lookup_mut<'a>(doc: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let mut segments = path.split('.');
    let mut current = doc.get_mut(segments.next()?)?;
    for segment in segments {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

fn parse_id(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}

fn summarize(target: Collection, doc: &Document) -> Value {
    let mut summary = Map::new();
    for field in ["_id", "customId", target.display_field()] {
        if let Some(value) = doc.get(field) {
            summary.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(summary)
}

/// Expand references of `docs` in place. Dangling single references become null and
/// dangling list entries are dropped.
pub async fn populate(store: &dyn Store, collection: Collection, docs: &mut [Document]) -> Result<(), StoreError> {
    let fields = reference_fields(collection);
    if fields.is_empty() || docs.is_empty() {
        return Ok(());
    }

    let mut wanted: HashMap<Collection, BTreeSet<Uuid>> = HashMap::new();
    for doc in docs.iter() {
        for field in &fields {
            let ids = wanted.entry(field.target).or_default();
            match crate::filter::matcher::lookup(doc, &field.path) {
                Some(Value::Array(items)) => ids.extend(items.iter().filter_map(parse_id)),
                Some(value) => ids.extend(parse_id(value)),
                None => {}
            }
        }
    }

    let mut summaries: HashMap<(Collection, Uuid), Value> = HashMap::new();
    for (target, ids) in wanted {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        for found in store.find_by_ids(target, &ids).await? {
            if let Some(id) = document_id(&found) {
                summaries.insert((target, id), summarize(target, &found));
            }
        }
    }

    for doc in docs.iter_mut() {
        for field in &fields {
            let Some(value) = lookup_mut(doc, &field.path) else {
                continue;
            };
            let resolve = |v: &Value| parse_id(v).and_then(|id| summaries.get(&(field.target, id)).cloned());
            let expanded = match (field.arity, &*value) {
                (Arity::Many, Value::Array(items)) => Some(Value::Array(items.iter().filter_map(resolve).collect())),
                (Arity::One, current @ Value::String(_)) => Some(resolve(current).unwrap_or(Value::Null)),
                _ => None,
            };
            if let Some(expanded) = expanded {
                *value = expanded;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use serde_json::json;

    fn doc(id: Uuid, value: Value) -> Document {
        let mut doc = value.as_object().cloned().unwrap();
        doc.insert("_id".to_string(), json!(id.to_string()));
        doc
    }

    #[test]
    fn council_fields_cover_every_roster_slot() {
        let fields = reference_fields(Collection::Councils);
        let slots: usize = ROSTER.iter().map(|c| c.slots.len() + c.lists.len()).sum();
        assert_eq!(fields.len(), slots + 1);
        assert!(fields.contains(&RefField::one("finance.treasurer", Collection::Memberships)));
        assert!(fields.contains(&RefField::many("administrativeOffice.trustees", Collection::Memberships)));
    }

    #[tokio::test]
    async fn expands_single_and_list_references() {
        let store = MemoryStore::new();
        let church = Uuid::new_v4();
        let (m1, m2) = (Uuid::new_v4(), Uuid::new_v4());
        store
            .insert(
                Collection::LocalChurches,
                church,
                doc(church, json!({"customId": "LC-0001", "name": "Grace", "address": "Manila"})),
            )
            .await
            .unwrap();
        store
            .insert(Collection::Memberships, m1, doc(m1, json!({"customId": "UMC-00001", "name": {"firstName": "Ana"}})))
            .await
            .unwrap();

        let ministry = Uuid::new_v4();
        let mut docs = vec![doc(
            ministry,
            json!({
                "name": "Choir",
                "localChurch": church.to_string(),
                "members": [m1.to_string(), m2.to_string()]
            }),
        )];
        populate(&store, Collection::Ministries, &mut docs).await.unwrap();

        assert_eq!(
            docs[0]["localChurch"],
            json!({"_id": church.to_string(), "customId": "LC-0001", "name": "Grace"})
        );
        let members = docs[0]["members"].as_array().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["customId"], "UMC-00001");
    }
}
