use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{date, require_text};
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub local_church: Uuid,
    pub title: String,
    #[serde(deserialize_with = "date::deserialize")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for History {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "title", &self.title);
        errors
    }
}

impl Resource for History {
    const COLLECTION: Collection = Collection::Histories;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[("localChurch", "localChurch")];
}
