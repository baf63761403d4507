use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{id_list, require_text};
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ministry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub local_church: Uuid,
    #[serde(default, deserialize_with = "id_list::deserialize")]
    pub members: Vec<Uuid>,
}

impl Validate for Ministry {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "name", &self.name);
        errors
    }
}

impl Resource for Ministry {
    const COLLECTION: Collection = Collection::Ministries;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[("name", "name"), ("localChurch", "localChurch")];
}
