// Ring 7: Audit - one log entry per committed mutation
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::{Document, Store, StoreError};
use crate::models::AuditLogEntry;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

/// Fields never written to the audit trail
const REDACTED: &[&str] = &["password"];

fn snapshot(doc: Option<&Document>) -> Value {
    match doc {
        Some(doc) => {
            let mut doc = doc.clone();
            for field in REDACTED {
                doc.remove(*field);
            }
            Value::Object(doc)
        }
        None => Value::Null,
    }
}

/// Append an entry to the audit log
pub async fn record(
    store: &dyn Store,
    action: &str,
    collection: Collection,
    document_id: Uuid,
    data: Value,
    performed_by: Option<Uuid>,
) -> Result<(), StoreError> {
    let entry = AuditLogEntry {
        id: Uuid::new_v4(),
        action: action.to_string(),
        collection: collection.name().to_string(),
        document_id,
        data,
        performed_by,
        timestamp: Utc::now(),
    };
    let id = entry.id;
    let doc = match serde_json::to_value(&entry) {
        Ok(Value::Object(doc)) => doc,
        Ok(_) => return Err(StoreError::Malformed("audit entry is not an object".to_string())),
        Err(e) => return Err(StoreError::Malformed(e.to_string())),
    };
    store.insert(Collection::Logs, id, doc).await
}

#[derive(Default)]
pub struct AuditRecorder;

#[async_trait]
impl Observer for AuditRecorder {
    fn name(&self) -> &'static str {
        "AuditRecorder"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Audit
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection.is_audited()
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let current = match ctx.operation {
            Operation::Delete => None,
            _ => Some(&ctx.record),
        };
        let data = json!({
            "previous": snapshot(ctx.previous.as_ref()),
            "current": snapshot(current),
        });

        record(
            ctx.store.as_ref(),
            ctx.operation.audit_action(),
            ctx.collection,
            ctx.id,
            data,
            ctx.performed_by,
        )
        .await?;
        Ok(())
    }
}
