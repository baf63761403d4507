// Ring 3: Business - family roles and shared local church
use async_trait::async_trait;
use serde_json::Value;

use crate::database::store::reference;
use crate::models::membership::Gender;
use crate::models::Family;
use crate::observer::context::{ObserverContext, ResolvedReferences};
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

#[derive(Default)]
pub struct FamilyRules;

fn gender_of(doc: &crate::database::Document) -> Option<&str> {
    doc.get("gender").and_then(Value::as_str)
}

#[async_trait]
impl Observer for FamilyRules {
    fn name(&self) -> &'static str {
        "FamilyRules"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Families
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let family: Family = serde_json::from_value(Value::Object(ctx.record.clone()))
            .map_err(|e| ObserverError::validation(format!("Invalid family: {e}")))?;
        let resolved = ctx
            .get_metadata::<ResolvedReferences>()
            .ok_or_else(|| ObserverError::validation("Family references were not resolved"))?;

        if family.father.is_none() && family.mother.is_none() && family.children.is_empty() {
            return Err(ObserverError::field("father", "at least one of father, mother or children is required"));
        }

        let member = |id| resolved.get(Collection::Memberships, id);
        if let Some(father) = family.father.and_then(member) {
            if gender_of(father) != Some(Gender::Male.as_str()) {
                return Err(ObserverError::field("father", "must be male"));
            }
        }
        if let Some(mother) = family.mother.and_then(member) {
            if gender_of(mother) != Some(Gender::Female.as_str()) {
                return Err(ObserverError::field("mother", "must be female"));
            }
        }

        let outside = family
            .member_ids()
            .into_iter()
            .filter_map(member)
            .any(|doc| reference(doc, "localChurch") != Some(family.local_church));
        if outside {
            return Err(ObserverError::InvalidReference(
                "All family members must belong to the same local church.".to_string(),
            ));
        }
        Ok(())
    }
}
