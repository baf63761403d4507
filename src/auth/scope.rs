//! Role-scoped access resolution.
//!
//! A caller's role and scope entity are resolved once per request into an
//! [`AccessScope`]: the sets of annual conferences, districts and local churches
//! the caller may act on. Every list query, detail read and write check is
//! answered from that value instead of branching on the role in each handler.

use std::collections::BTreeSet;

use serde_json::json;
use uuid::Uuid;

use crate::database::store::{document_id, reference, Document, Store, StoreError};
use crate::filter::{Clause, FilterData, FilterOp, FilterWhereInfo};
use crate::types::{Collection, Role};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSets {
    /// Writable: the scope entity and everything below it
    pub annuals: BTreeSet<Uuid>,
    pub districts: BTreeSet<Uuid>,
    pub churches: BTreeSet<Uuid>,
    /// Read-only: the chain above the scope entity
    pub ancestor_annuals: BTreeSet<Uuid>,
    pub ancestor_districts: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// admin and national
    Unrestricted,
    Scoped(ScopeSets),
}

impl AccessScope {
    /// Resolve the reachable hierarchy for a role and its scope entity.
    /// A scoped role without a scope entity reaches nothing.
    pub async fn resolve(store: &dyn Store, role: Role, scope: Option<Uuid>) -> Result<Self, StoreError> {
        let mut sets = ScopeSets::default();
        let Some(entity) = scope else {
            return Ok(match role {
                Role::Admin | Role::National => AccessScope::Unrestricted,
                _ => AccessScope::Scoped(sets),
            });
        };

        match role {
            Role::Admin | Role::National => return Ok(AccessScope::Unrestricted),
            Role::Annual => {
                sets.annuals.insert(entity);
                let districts = store
                    .find(Collection::Districts, &FilterData::new().where_eq("annualConference", entity.to_string()))
                    .await?;
                sets.districts.extend(districts.iter().filter_map(document_id));
                sets.churches = churches_of(store, &sets.districts).await?;
            }
            Role::District => {
                sets.districts.insert(entity);
                if let Some(district) = store.find_by_id(Collection::Districts, entity).await? {
                    sets.ancestor_annuals.extend(reference(&district, "annualConference"));
                }
                sets.churches = churches_of(store, &sets.districts).await?;
            }
            Role::Local => {
                sets.churches.insert(entity);
                if let Some(church) = store.find_by_id(Collection::LocalChurches, entity).await? {
                    if let Some(district_id) = reference(&church, "district") {
                        sets.ancestor_districts.insert(district_id);
                        if let Some(district) = store.find_by_id(Collection::Districts, district_id).await? {
                            sets.ancestor_annuals.extend(reference(&district, "annualConference"));
                        }
                    }
                }
            }
        }
        Ok(AccessScope::Scoped(sets))
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, AccessScope::Unrestricted)
    }

    /// Condition intersected with every list query; None when nothing is filtered out
    pub fn filter_for(&self, collection: Collection) -> Option<Clause> {
        let AccessScope::Scoped(sets) = self else {
            return None;
        };
        let (column, ids): (&str, Vec<&Uuid>) = match collection {
            Collection::AnnualConferences => ("_id", sets.annuals.union(&sets.ancestor_annuals).collect()),
            Collection::Districts => ("_id", sets.districts.union(&sets.ancestor_districts).collect()),
            Collection::LocalChurches => ("_id", sets.churches.iter().collect()),
            Collection::Users | Collection::Logs => ("_id", vec![]),
            _ => ("localChurch", sets.churches.iter().collect()),
        };
        Some(Clause::Where(FilterWhereInfo {
            column: column.to_string(),
            operator: FilterOp::In,
            data: json!(ids.iter().map(|id| id.to_string()).collect::<Vec<_>>()),
        }))
    }

    /// Single-record read check
    pub fn permits(&self, collection: Collection, doc: &Document) -> bool {
        let AccessScope::Scoped(sets) = self else {
            return true;
        };
        let id = document_id(doc);
        match collection {
            Collection::AnnualConferences => {
                id.is_some_and(|id| sets.annuals.contains(&id) || sets.ancestor_annuals.contains(&id))
            }
            Collection::Districts => {
                id.is_some_and(|id| sets.districts.contains(&id) || sets.ancestor_districts.contains(&id))
            }
            _ => self.permits_write(collection, doc),
        }
    }

    /// Check for updating or deleting an existing record
    pub fn permits_write(&self, collection: Collection, doc: &Document) -> bool {
        let AccessScope::Scoped(sets) = self else {
            return true;
        };
        let id = document_id(doc);
        match collection {
            Collection::AnnualConferences => id.is_some_and(|id| sets.annuals.contains(&id)),
            Collection::Districts => id.is_some_and(|id| sets.districts.contains(&id)),
            Collection::LocalChurches => id.is_some_and(|id| sets.churches.contains(&id)),
            Collection::Users | Collection::Logs => false,
            _ => reference(doc, "localChurch").is_some_and(|church| sets.churches.contains(&church)),
        }
    }

    /// Check that a record may be placed under `owner` (create, or re-parent on update)
    pub fn permits_owner(&self, collection: Collection, owner: Option<Uuid>) -> bool {
        let AccessScope::Scoped(sets) = self else {
            return true;
        };
        let Some(owner) = owner else {
            return false;
        };
        match collection {
            Collection::Districts => sets.annuals.contains(&owner),
            Collection::LocalChurches => sets.districts.contains(&owner),
            Collection::AnnualConferences | Collection::Users | Collection::Logs => false,
            _ => sets.churches.contains(&owner),
        }
    }
}

async fn churches_of(store: &dyn Store, districts: &BTreeSet<Uuid>) -> Result<BTreeSet<Uuid>, StoreError> {
    if districts.is_empty() {
        return Ok(BTreeSet::new());
    }
    let filter = FilterData::new().where_in("district", districts.iter().map(Uuid::to_string));
    let churches = store.find(Collection::LocalChurches, &filter).await?;
    Ok(churches.iter().filter_map(document_id).collect())
}
