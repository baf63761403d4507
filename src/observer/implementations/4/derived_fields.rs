// Ring 4: Enrichment - computed record fields
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::models::{Attendance, Membership};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Collection, Operation};

/// Age, organization and sacrament flags, recomputed on every save
#[derive(Default)]
pub struct MembershipDerivedFields;

#[async_trait]
impl Observer for MembershipDerivedFields {
    fn name(&self) -> &'static str {
        "MembershipDerivedFields"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Memberships
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let member: Membership = serde_json::from_value(Value::Object(ctx.record.clone()))
            .map_err(|e| ObserverError::validation(format!("Invalid membership: {e}")))?;
        let derived = member.derive(ctx.now.date_naive());

        if let Value::Object(fields) = json!(derived) {
            ctx.record.extend(fields);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct AttendanceTotals;

#[async_trait]
impl Observer for AttendanceTotals {
    fn name(&self) -> &'static str {
        "AttendanceTotals"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Attendances
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let attendance: Attendance = serde_json::from_value(Value::Object(ctx.record.clone()))
            .map_err(|e| ObserverError::validation(format!("Invalid attendance: {e}")))?;
        ctx.record.insert("total".to_string(), json!(attendance.total()));
        Ok(())
    }
}
