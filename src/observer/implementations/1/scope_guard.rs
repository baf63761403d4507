// Ring 1: Security - the caller's scope must cover the stored record and its new owner
use async_trait::async_trait;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

const OUT_OF_SCOPE: &str = "You do not have access to this resource";

#[derive(Default)]
pub struct ScopeGuard;

#[async_trait]
impl Observer for ScopeGuard {
    fn name(&self) -> &'static str {
        "ScopeGuard"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Security
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.scope.is_unrestricted() {
            return Ok(());
        }

        if let Some(previous) = &ctx.previous {
            if !ctx.scope.permits_write(ctx.collection, previous) {
                return Err(ObserverError::Forbidden(OUT_OF_SCOPE.to_string()));
            }
        }

        let placing = match ctx.operation {
            Operation::Create => true,
            Operation::Update => ctx.owner() != ctx.previous_owner(),
            Operation::Delete => false,
        };
        if placing && !ctx.scope.permits_owner(ctx.collection, ctx.owner()) {
            return Err(ObserverError::Forbidden(OUT_OF_SCOPE.to_string()));
        }
        Ok(())
    }
}
