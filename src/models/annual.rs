use serde::{Deserialize, Serialize};

use super::common::require_text;
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpiscopalArea {
    Bea,
    Dea,
    Mea,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualConference {
    pub name: String,
    pub episcopal_area: EpiscopalArea,
}

impl Validate for AnnualConference {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "name", &self.name);
        errors
    }
}

impl Resource for AnnualConference {
    const COLLECTION: Collection = Collection::AnnualConferences;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[("name", "name"), ("episcopalArea", "episcopalArea")];
}
