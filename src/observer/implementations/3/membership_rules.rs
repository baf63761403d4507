// Ring 3: Business - per-church name check and ministry cleanup on delete
use async_trait::async_trait;

use crate::database::store::document_id;
use crate::database::Write;
use crate::filter::FilterData;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

#[derive(Default)]
pub struct MembershipRules;

#[async_trait]
impl Observer for MembershipRules {
    fn name(&self) -> &'static str {
        "MembershipRules"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Memberships
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.operation == Operation::Delete {
            ctx.writes.push(Write::Pull {
                collection: Collection::Ministries,
                ids: None,
                field: "members",
                value: ctx.id,
            });
            return Ok(());
        }

        // The store also keeps names unique across every church
        let (Some(name), Some(church)) = (ctx.record.get("name").cloned(), ctx.reference("localChurch")) else {
            return Ok(());
        };
        let filter = FilterData::new()
            .where_eq("name", name)
            .where_eq("localChurch", church.to_string());
        let duplicate = ctx
            .store
            .find(Collection::Memberships, &filter)
            .await?
            .iter()
            .any(|doc| document_id(doc) != Some(ctx.id));
        if duplicate {
            return Err(ObserverError::Conflict("Member already exists in this local church".to_string()));
        }
        Ok(())
    }
}
