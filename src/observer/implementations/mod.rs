// Observer implementations organized by rings
// Each ring handles a specific phase of a record write

// Ring 0: Data Preparation - load the stored record, carry system fields
#[path = "0/load_existing.rs"]
pub mod load_existing;

// Ring 1: Security - hierarchical scope checks
#[path = "1/scope_guard.rs"]
pub mod scope_guard;

// Ring 2: Input Validation - reference resolution
#[path = "2/reference_validator.rs"]
pub mod reference_validator;

// Ring 3: Business - domain rules and cross-collection writes
#[path = "3/council_composition.rs"]
pub mod council_composition;
#[path = "3/family_rules.rs"]
pub mod family_rules;
#[path = "3/membership_rules.rs"]
pub mod membership_rules;
#[path = "3/ministry_roster.rs"]
pub mod ministry_roster;

// Ring 4: Enrichment - derived fields, credentials, timestamps, custom ids
#[path = "4/derived_fields.rs"]
pub mod derived_fields;
#[path = "4/record_metadata.rs"]
pub mod record_metadata;
#[path = "4/user_credentials.rs"]
pub mod user_credentials;

// Ring 5: Database - atomic batch write
#[path = "5/record_persistence.rs"]
pub mod record_persistence;

// Ring 7: Audit - change tracking
#[path = "7/audit_recorder.rs"]
pub mod audit_recorder;

// Helper for registering observers (not ring-specific)
pub mod registry;
pub use registry::*;

pub use audit_recorder::AuditRecorder;
pub use council_composition::CouncilComposition;
pub use derived_fields::{AttendanceTotals, MembershipDerivedFields};
pub use family_rules::FamilyRules;
pub use load_existing::LoadExisting;
pub use membership_rules::MembershipRules;
pub use ministry_roster::MinistryRoster;
pub use record_metadata::{CustomIdAssigner, Timestamps};
pub use record_persistence::RecordPersistence;
pub use reference_validator::ReferenceValidator;
pub use scope_guard::ScopeGuard;
pub use user_credentials::UserCredentials;
