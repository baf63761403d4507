// Helper for registering every record observer
use crate::observer::pipeline::ObserverPipeline;

use super::{
    AttendanceTotals, AuditRecorder, CouncilComposition, CustomIdAssigner, FamilyRules, LoadExisting,
    MembershipDerivedFields, MembershipRules, MinistryRoster, RecordPersistence, ReferenceValidator,
    ScopeGuard, Timestamps, UserCredentials,
};

/// Register the observers every create, update and delete runs through
pub fn register_all_observers(pipeline: &mut ObserverPipeline) {
    pipeline.register_observer(Box::new(LoadExisting));
    pipeline.register_observer(Box::new(ScopeGuard));
    pipeline.register_observer(Box::new(ReferenceValidator));

    pipeline.register_observer(Box::new(CouncilComposition));
    pipeline.register_observer(Box::new(FamilyRules));
    pipeline.register_observer(Box::new(MembershipRules));
    pipeline.register_observer(Box::new(MinistryRoster));

    pipeline.register_observer(Box::new(MembershipDerivedFields));
    pipeline.register_observer(Box::new(AttendanceTotals));
    pipeline.register_observer(Box::new(UserCredentials));
    pipeline.register_observer(Box::new(Timestamps));
    pipeline.register_observer(Box::new(CustomIdAssigner));

    pipeline.register_observer(Box::new(RecordPersistence));
    pipeline.register_observer(Box::new(AuditRecorder));
}
