// Ring 4: Enrichment - timestamps and the display identifier
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::Value;

use crate::database::next_id;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

#[derive(Default)]
pub struct Timestamps;

#[async_trait]
impl Observer for Timestamps {
    fn name(&self) -> &'static str {
        "Timestamps"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let now = Value::String(ctx.now.to_rfc3339_opts(SecondsFormat::Millis, true));
        if !ctx.record.contains_key("createdAt") {
            ctx.record.insert("createdAt".to_string(), now.clone());
        }
        ctx.record.insert("updatedAt".to_string(), now);
        Ok(())
    }
}

/// Allocates the `customId` last, so rejected writes do not consume a sequence number
#[derive(Default)]
pub struct CustomIdAssigner;

#[async_trait]
impl Observer for CustomIdAssigner {
    fn name(&self) -> &'static str {
        "CustomIdAssigner"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op == Operation::Create
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection.id_format().is_some()
    }

    fn priority(&self) -> u8 {
        90
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let Some(format) = ctx.collection.id_format() else {
            return Ok(());
        };
        let custom_id = next_id(ctx.store.as_ref(), format).await?;
        tracing::debug!("Assigned {} to {} {}", custom_id, ctx.collection, ctx.id);
        ctx.record.insert("customId".to_string(), Value::String(custom_id));
        Ok(())
    }
}
