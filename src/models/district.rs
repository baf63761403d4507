use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::require_text;
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub name: String,
    pub annual_conference: Uuid,
}

impl Validate for District {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "name", &self.name);
        errors
    }
}

impl Resource for District {
    const COLLECTION: Collection = Collection::Districts;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] =
        &[("name", "name"), ("annualConference", "annualConference")];
}
