use async_trait::async_trait;
use std::time::Duration;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::types::{Collection, Operation};

/// Observer rings with semantic meaning. Rings before `Audit` run in order and
/// abort the write on the first error; `Audit` runs only after the store confirms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObserverRing {
    DataPreparation = 0, // Load the stored record, carry system fields
    Security = 1,        // Scope checks against the stored and incoming owner
    InputValidation = 2, // Reference resolution
    Business = 3,        // Domain rules, cross-collection writes
    Enrichment = 4,      // Derived fields, custom id, timestamps
    Database = 5,        // Atomic batch write
    Audit = 7,           // Change tracking
}

impl ObserverRing {
    pub const ORDERED: &'static [ObserverRing] = &[
        ObserverRing::DataPreparation,
        ObserverRing::Security,
        ObserverRing::InputValidation,
        ObserverRing::Business,
        ObserverRing::Enrichment,
        ObserverRing::Database,
        ObserverRing::Audit,
    ];

    /// Rings whose failure aborts the operation
    pub fn is_synchronous(&self) -> bool {
        (*self as u8) <= ObserverRing::Database as u8
    }
}

/// A unit of work attached to one ring of the write pipeline
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    fn ring(&self) -> ObserverRing;

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    fn applies_to_collection(&self, _collection: Collection) -> bool {
        true
    }

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    /// Priority within ring (lower numbers execute first)
    fn priority(&self) -> u8 {
        50
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}
