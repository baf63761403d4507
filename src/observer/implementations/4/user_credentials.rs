// Ring 4: Enrichment - hash incoming passwords, keep the stored hash otherwise
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::hash_password;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

#[derive(Default)]
pub struct UserCredentials;

#[async_trait]
impl Observer for UserCredentials {
    fn name(&self) -> &'static str {
        "UserCredentials"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Users
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let plain = ctx
            .record
            .get("password")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let hash = match plain {
            Some(plain) => {
                // Argon2 is CPU bound
                tokio::task::spawn_blocking(move || hash_password(&plain))
                    .await
                    .map_err(|e| ObserverError::validation(format!("Password hashing failed: {e}")))??
            }
            None => ctx
                .previous
                .as_ref()
                .and_then(|prev| prev.get("password"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ObserverError::field("password", "is required"))?,
        };

        ctx.record.insert("password".to_string(), Value::String(hash));
        Ok(())
    }
}
