use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::AccessScope;
use crate::database::store::{reference, references};
use crate::database::{Document, Store, Write};
use crate::observer::traits::ObserverRing;
use crate::types::{Collection, Operation};

/// State that flows through the observer pipeline for one create, update or delete
pub struct ObserverContext {
    pub operation: Operation,
    pub collection: Collection,
    pub store: Arc<dyn Store>,

    /// Primary key of the target record (generated on create)
    pub id: Uuid,
    /// Incoming body on create/update, the stored record on delete
    pub record: Document,
    /// Stored record before the change (update/delete), loaded in ring 0
    pub previous: Option<Document>,

    pub performed_by: Option<Uuid>,
    pub scope: AccessScope,

    /// Secondary writes committed in the same batch as the primary write
    pub writes: Vec<Write>,
    pub now: DateTime<Utc>,

    // Type-safe metadata storage for cross-observer communication
    metadata: HashMap<TypeId, Box<dyn Any + Send + Sync>>,

    pub start_time: Instant,
    pub current_ring: Option<ObserverRing>,
}

impl ObserverContext {
    pub fn new(
        operation: Operation,
        collection: Collection,
        store: Arc<dyn Store>,
        id: Uuid,
        record: Document,
        scope: AccessScope,
        performed_by: Option<Uuid>,
    ) -> Self {
        Self {
            operation,
            collection,
            store,
            id,
            record,
            previous: None,
            performed_by,
            scope,
            writes: Vec::new(),
            now: Utc::now(),
            metadata: HashMap::new(),
            start_time: Instant::now(),
            current_ring: None,
        }
    }

    /// Store typed metadata
    pub fn set_metadata<T: Send + Sync + 'static>(&mut self, data: T) {
        self.metadata.insert(TypeId::of::<T>(), Box::new(data));
    }

    /// Retrieve typed metadata
    pub fn get_metadata<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.metadata
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Single reference on the incoming record
    pub fn reference(&self, field: &str) -> Option<Uuid> {
        reference(&self.record, field)
    }

    /// List reference on the incoming record
    pub fn references(&self, field: &str) -> Vec<Uuid> {
        references(&self.record, field)
    }

    /// Owner reference of the incoming record, if the collection has one
    pub fn owner(&self) -> Option<Uuid> {
        self.collection.owner_field().and_then(|field| self.reference(field))
    }

    pub fn previous_owner(&self) -> Option<Uuid> {
        let field = self.collection.owner_field()?;
        self.previous.as_ref().and_then(|prev| reference(prev, field))
    }

    pub fn execution_time(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

/// References resolved in ring 2, keyed by target collection and id
#[derive(Debug, Clone, Default)]
pub struct ResolvedReferences {
    pub docs: HashMap<(Collection, Uuid), Document>,
}

impl ResolvedReferences {
    pub fn get(&self, collection: Collection, id: Uuid) -> Option<&Document> {
        self.docs.get(&(collection, id))
    }
}
