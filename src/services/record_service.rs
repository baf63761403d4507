use std::sync::Arc;

use uuid::Uuid;

use crate::auth::AccessScope;
use crate::database::{Document, Store};
use crate::observer::{ObserverContext, ObserverError, ObserverPipeline};
use crate::types::{Collection, Operation};

/// Runs create, update and delete through the observer pipeline
pub struct RecordService {
    store: Arc<dyn Store>,
    pipeline: Arc<ObserverPipeline>,
}

impl RecordService {
    pub fn new(store: Arc<dyn Store>, pipeline: Arc<ObserverPipeline>) -> Self {
        Self { store, pipeline }
    }

    /// Service with the standard observer set
    pub fn standard(store: Arc<dyn Store>) -> Self {
        Self::new(store, Arc::new(ObserverPipeline::standard()))
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn create(
        &self,
        collection: Collection,
        body: Document,
        scope: AccessScope,
        performed_by: Option<Uuid>,
    ) -> Result<Document, ObserverError> {
        self.run(Operation::Create, collection, Uuid::new_v4(), body, scope, performed_by)
            .await
    }

    /// Full replacement of the stored record
    pub async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        body: Document,
        scope: AccessScope,
        performed_by: Option<Uuid>,
    ) -> Result<Document, ObserverError> {
        self.run(Operation::Update, collection, id, body, scope, performed_by).await
    }

    /// Returns the deleted record
    pub async fn delete(
        &self,
        collection: Collection,
        id: Uuid,
        scope: AccessScope,
        performed_by: Option<Uuid>,
    ) -> Result<Document, ObserverError> {
        self.run(Operation::Delete, collection, id, Document::new(), scope, performed_by)
            .await
    }

    async fn run(
        &self,
        operation: Operation,
        collection: Collection,
        id: Uuid,
        body: Document,
        scope: AccessScope,
        performed_by: Option<Uuid>,
    ) -> Result<Document, ObserverError> {
        let ctx = ObserverContext::new(operation, collection, self.store.clone(), id, body, scope, performed_by);
        let ctx = self.pipeline.execute(ctx).await?;
        Ok(ctx.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::filter::FilterData;
    use serde_json::{json, Value};

    fn body(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn service() -> (RecordService, Arc<dyn Store>) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        (RecordService::standard(store.clone()), store)
    }

    #[tokio::test]
    async fn create_assigns_ids_and_timestamps() {
        let (records, _) = service();
        let annual = records
            .create(
                Collection::AnnualConferences,
                body(json!({"name": "Manila", "episcopalArea": "bea"})),
                AccessScope::Unrestricted,
                None,
            )
            .await
            .unwrap();

        assert_eq!(annual["customId"], "AC-0001");
        assert!(annual["_id"].is_string());
        assert_eq!(annual["createdAt"], annual["updatedAt"]);
    }

    #[tokio::test]
    async fn update_keeps_custom_id_and_created_at() {
        let (records, store) = service();
        let created = records
            .create(
                Collection::AnnualConferences,
                body(json!({"name": "Manila", "episcopalArea": "bea"})),
                AccessScope::Unrestricted,
                None,
            )
            .await
            .unwrap();
        let id = Uuid::parse_str(created["_id"].as_str().unwrap()).unwrap();

        let updated = records
            .update(
                Collection::AnnualConferences,
                id,
                body(json!({"name": "Metro Manila", "episcopalArea": "bea", "customId": "AC-9999"})),
                AccessScope::Unrestricted,
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated["customId"], "AC-0001");
        assert_eq!(updated["createdAt"], created["createdAt"]);

        let stored = store.find_by_id(Collection::AnnualConferences, id).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Metro Manila");
    }

    #[tokio::test]
    async fn delete_of_missing_record_is_not_found() {
        let (records, store) = service();
        let err = records
            .delete(Collection::Histories, Uuid::new_v4(), AccessScope::Unrestricted, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ObserverError::NotFound(_)));
        assert_eq!(store.count(Collection::Logs, &FilterData::new()).await.unwrap(), 0);
    }
}
