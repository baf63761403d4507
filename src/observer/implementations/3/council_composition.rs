// Ring 3: Business - council term and roster integrity
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::database::store::reference;
use crate::models::Council;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

#[derive(Default)]
pub struct CouncilComposition;

#[async_trait]
impl Observer for CouncilComposition {
    fn name(&self) -> &'static str {
        "CouncilComposition"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Councils
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let council: Council = serde_json::from_value(Value::Object(ctx.record.clone()))
            .map_err(|e| ObserverError::validation(format!("Invalid council: {e}")))?;

        if !council.term_is_valid() {
            return Err(ObserverError::field(
                "endYear",
                "must be at least 12 months after startYear",
            ));
        }

        let member_ids: Vec<Uuid> = council.member_ids().into_iter().collect();
        let members = ctx.store.find_by_ids(Collection::Memberships, &member_ids).await?;
        if members.len() != member_ids.len() {
            tracing::warn!(
                "Council {}: {} of {} members resolved",
                ctx.id,
                members.len(),
                member_ids.len()
            );
            return Err(ObserverError::InvalidReference("Invalid member reference in council.".to_string()));
        }

        if members
            .iter()
            .any(|member| reference(member, "localChurch") != Some(council.local_church))
        {
            return Err(ObserverError::InvalidReference(
                "All members must belong to the same local church.".to_string(),
            ));
        }
        Ok(())
    }
}
