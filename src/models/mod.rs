pub mod annual;
pub mod attendance;
pub mod audit_log;
pub mod common;
pub mod council;
pub mod district;
pub mod family;
pub mod history;
pub mod local_church;
pub mod membership;
pub mod ministry;
pub mod user;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Document;
use crate::filter::{FilterData, SortDirection};
use crate::types::{Collection, Operation};

pub use annual::AnnualConference;
pub use attendance::Attendance;
pub use audit_log::AuditLogEntry;
pub use council::Council;
pub use district::District;
pub use family::Family;
pub use history::History;
pub use local_church::LocalChurch;
pub use membership::Membership;
pub use ministry::Ministry;
pub use user::User;

/// A field-level validation failure reported in the `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Shape checks that need no store access
pub trait Validate {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        vec![]
    }
}

/// A REST resource backed by one collection. The type itself is the request body.
pub trait Resource: DeserializeOwned + Serialize + Validate + Send + 'static {
    const COLLECTION: Collection;

    /// Query parameters that map to an equality filter, as `(param, document path)`
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[];

    /// Extra list filtering beyond [`Resource::EQ_FILTERS`]
    fn extra_filter(filter: FilterData, _params: &HashMap<String, String>) -> FilterData {
        filter
    }

    fn list_filter(params: &HashMap<String, String>) -> FilterData {
        let mut filter = FilterData::new();
        for (param, column) in Self::EQ_FILTERS {
            if let Some(raw) = params.get(*param).filter(|v| !v.is_empty()) {
                filter = match raw.as_str() {
                    "true" => filter.where_eq(*column, true),
                    "false" => filter.where_eq(*column, false),
                    _ => filter.where_eq(*column, raw),
                };
            }
        }
        Self::extra_filter(filter, params).order_by("customId", SortDirection::Asc)
    }

    /// Shape a stored document for a response
    fn present(doc: Document) -> Document {
        doc
    }
}
