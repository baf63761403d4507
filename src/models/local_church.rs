use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{check_mobile_number, date, require_text};
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalChurch {
    pub name: String,
    pub address: String,
    pub district: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_no: Option<String>,
    #[serde(default, deserialize_with = "date::option::deserialize", skip_serializing_if = "Option::is_none")]
    pub anniversary_date: Option<NaiveDate>,
}

impl Validate for LocalChurch {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "address", &self.address);
        check_mobile_number(&mut errors, "contactNo", self.contact_no.as_deref());
        errors
    }
}

impl Resource for LocalChurch {
    const COLLECTION: Collection = Collection::LocalChurches;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[("name", "name"), ("district", "district")];
}
