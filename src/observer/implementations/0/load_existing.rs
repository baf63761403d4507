// Ring 0: Data Preparation - load the stored record and carry system fields
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

/// Fields owned by the system, never taken from a request body
const CARRIED_FIELDS: &[&str] = &["customId", "createdAt"];

#[derive(Default)]
pub struct LoadExisting;

#[async_trait]
impl Observer for LoadExisting {
    fn name(&self) -> &'static str {
        "LoadExisting"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for field in ["_id", "customId", "createdAt", "updatedAt"] {
            ctx.record.remove(field);
        }
        if ctx.collection == Collection::Memberships {
            ctx.record.remove("ministries");
        }

        if ctx.operation == Operation::Create {
            ctx.record.insert("_id".to_string(), json!(ctx.id.to_string()));
            if ctx.collection == Collection::Memberships {
                ctx.record.insert("ministries".to_string(), Value::Array(vec![]));
            }
            return Ok(());
        }

        let previous = ctx
            .store
            .find_by_id(ctx.collection, ctx.id)
            .await?
            .ok_or_else(|| ObserverError::NotFound(format!("{} not found", ctx.collection.label())))?;

        match ctx.operation {
            Operation::Delete => ctx.record = previous.clone(),
            _ => {
                ctx.record.insert("_id".to_string(), json!(ctx.id.to_string()));
                for field in CARRIED_FIELDS {
                    if let Some(value) = previous.get(*field) {
                        ctx.record.insert(field.to_string(), value.clone());
                    }
                }
                // Maintained from the ministry side
                if ctx.collection == Collection::Memberships {
                    let ministries = previous.get("ministries").cloned().unwrap_or(Value::Array(vec![]));
                    ctx.record.insert("ministries".to_string(), ministries);
                }
            }
        }

        tracing::debug!("Loaded existing {} {}", ctx.collection, ctx.id);
        ctx.previous = Some(previous);
        Ok(())
    }
}
