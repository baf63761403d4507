use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{date, require_text};
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

/// Headcount for one service. `total` is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub local_church: Uuid,
    #[serde(deserialize_with = "date::deserialize")]
    pub date: NaiveDate,
    pub service: String,
    #[serde(default)]
    pub men: u32,
    #[serde(default)]
    pub women: u32,
    #[serde(default)]
    pub youth: u32,
    #[serde(default)]
    pub children: u32,
}

impl Attendance {
    pub fn total(&self) -> u64 {
        [self.men, self.women, self.youth, self.children]
            .iter()
            .map(|n| u64::from(*n))
            .sum()
    }
}

impl Validate for Attendance {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "service", &self.service);
        errors
    }
}

impl Resource for Attendance {
    const COLLECTION: Collection = Collection::Attendances;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] =
        &[("localChurch", "localChurch"), ("service", "service")];
}
