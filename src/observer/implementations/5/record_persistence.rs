// Ring 5: Database - the primary write and every queued secondary write in one batch
use async_trait::async_trait;

use crate::database::Write;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct RecordPersistence;

#[async_trait]
impl Observer for RecordPersistence {
    fn name(&self) -> &'static str {
        "RecordPersistence"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let collection = ctx.collection;
        let id = ctx.id;
        let primary = match ctx.operation {
            Operation::Create => Write::Insert { collection, id, doc: ctx.record.clone() },
            Operation::Update => Write::Replace { collection, id, doc: ctx.record.clone() },
            Operation::Delete => Write::Delete { collection, id },
        };

        let mut batch = Vec::with_capacity(1 + ctx.writes.len());
        batch.push(primary);
        batch.extend(ctx.writes.iter().cloned());
        let size = batch.len();

        ctx.store.apply(batch).await?;
        tracing::info!("{} {} {} ({} writes)", ctx.operation.audit_action(), collection, id, size);
        Ok(())
    }
}
