// Ring 3: Business - ministry members share its church; membership.ministries mirrors ministry.members
use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::database::store::{reference, references};
use crate::database::Write;
use crate::observer::context::{ObserverContext, ResolvedReferences};
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

#[derive(Default)]
pub struct MinistryRoster;

#[async_trait]
impl Observer for MinistryRoster {
    fn name(&self) -> &'static str {
        "MinistryRoster"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Ministries
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.operation == Operation::Delete {
            ctx.writes.push(Write::Pull {
                collection: Collection::Memberships,
                ids: None,
                field: "ministries",
                value: ctx.id,
            });
            return Ok(());
        }

        let members: BTreeSet<Uuid> = ctx.references("members").into_iter().collect();
        let church = ctx.reference("localChurch");
        let resolved = ctx
            .get_metadata::<ResolvedReferences>()
            .ok_or_else(|| ObserverError::validation("Ministry references were not resolved"))?;
        let outside = members.iter().any(|id| {
            resolved
                .get(Collection::Memberships, *id)
                .map_or(true, |doc| reference(doc, "localChurch") != church)
        });
        if outside {
            return Err(ObserverError::InvalidReference(
                "All ministry members must belong to the same local church.".to_string(),
            ));
        }

        let before: BTreeSet<Uuid> = ctx
            .previous
            .as_ref()
            .map(|prev| references(prev, "members").into_iter().collect())
            .unwrap_or_default();
        let gained: Vec<Uuid> = members.difference(&before).copied().collect();
        let lost: Vec<Uuid> = before.difference(&members).copied().collect();

        ctx.record.insert(
            "members".to_string(),
            json!(members.iter().map(Uuid::to_string).collect::<Vec<_>>()),
        );
        if !gained.is_empty() {
            ctx.writes.push(Write::AddToSet {
                collection: Collection::Memberships,
                ids: gained,
                field: "ministries",
                value: ctx.id,
            });
        }
        if !lost.is_empty() {
            ctx.writes.push(Write::Pull {
                collection: Collection::Memberships,
                ids: Some(lost),
                field: "ministries",
                value: ctx.id,
            });
        }
        Ok(())
    }
}
