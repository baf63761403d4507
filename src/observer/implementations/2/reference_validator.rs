// Ring 2: Input Validation - every reference on the incoming record must resolve
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::populate::{Arity, RefField};
use crate::database::store::{document_id, reference};
use crate::observer::context::{ObserverContext, ResolvedReferences};
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

fn field(path: &str, target: Collection, arity: Arity) -> RefField {
    RefField { path: path.to_string(), target, arity }
}

/// References checked on write. Council roster members are checked by the council composer.
pub fn validated_references(collection: Collection) -> Vec<RefField> {
    use Arity::*;
    use Collection::*;
    match collection {
        Districts => vec![field("annualConference", AnnualConferences, One)],
        LocalChurches => vec![field("district", Districts, One)],
        Memberships => vec![
            field("localChurch", LocalChurches, One),
            field("father", Memberships, One),
            field("mother", Memberships, One),
            field("spouse", Memberships, One),
            field("children", Memberships, Many),
        ],
        Ministries => vec![
            field("localChurch", LocalChurches, One),
            field("members", Memberships, Many),
        ],
        Families => vec![
            field("localChurch", LocalChurches, One),
            field("father", Memberships, One),
            field("mother", Memberships, One),
            field("children", Memberships, Many),
        ],
        Councils | Attendances | Histories => vec![field("localChurch", LocalChurches, One)],
        Users => vec![
            field("annual", AnnualConferences, One),
            field("district", Districts, One),
            field("localChurch", LocalChurches, One),
        ],
        AnnualConferences | Logs => vec![],
    }
}

fn invalid(target: Collection) -> ObserverError {
    ObserverError::InvalidReference(format!("Invalid {} reference.", target.label()))
}

#[derive(Default)]
pub struct ReferenceValidator;

#[async_trait]
impl Observer for ReferenceValidator {
    fn name(&self) -> &'static str {
        "ReferenceValidator"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let fields = validated_references(ctx.collection);

        // One batch per target collection
        let mut requested: HashMap<Collection, BTreeSet<Uuid>> = HashMap::new();
        for f in &fields {
            let ids = match f.arity {
                Arity::One => ctx.reference(&f.path).into_iter().collect(),
                Arity::Many => ctx.references(&f.path),
            };
            requested.entry(f.target).or_default().extend(ids);
        }

        let mut resolved = ResolvedReferences::default();
        for (target, ids) in &requested {
            if ids.is_empty() {
                continue;
            }
            let ids: Vec<Uuid> = ids.iter().copied().collect();
            for doc in ctx.store.find_by_ids(*target, &ids).await? {
                if let Some(id) = document_id(&doc) {
                    resolved.docs.insert((*target, id), doc);
                }
            }
        }

        for f in &fields {
            let ids = match f.arity {
                Arity::One => ctx.reference(&f.path).into_iter().collect(),
                Arity::Many => ctx.references(&f.path),
            };
            if ids.iter().any(|id| resolved.get(f.target, *id).is_none()) {
                tracing::warn!("{} {}: unresolved {} reference", ctx.collection, ctx.id, f.path);
                return Err(invalid(f.target));
            }
        }

        // A local church's district must itself sit under an existing annual conference
        if ctx.collection == Collection::LocalChurches {
            let annual = ctx
                .reference("district")
                .and_then(|district| resolved.get(Collection::Districts, district))
                .and_then(|district| reference(district, "annualConference"))
                .ok_or_else(|| invalid(Collection::AnnualConferences))?;
            let doc = ctx
                .store
                .find_by_id(Collection::AnnualConferences, annual)
                .await?
                .ok_or_else(|| invalid(Collection::AnnualConferences))?;
            resolved.docs.insert((Collection::AnnualConferences, annual), doc);
        }

        ctx.set_metadata(resolved);
        Ok(())
    }
}
