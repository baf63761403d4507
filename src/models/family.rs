use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{date, id_list, require_text};
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<Uuid>,
    #[serde(default, deserialize_with = "id_list::deserialize")]
    pub children: Vec<Uuid>,
    #[serde(default, deserialize_with = "date::option::deserialize", skip_serializing_if = "Option::is_none")]
    pub wedding_date: Option<NaiveDate>,
    pub local_church: Uuid,
}

impl Family {
    /// Every member referenced by the family
    pub fn member_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.father.into_iter().chain(self.mother).collect();
        ids.extend(self.children.iter().copied());
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl Validate for Family {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "familyName", &self.family_name);
        if self.father.is_none() && self.mother.is_none() && self.children.is_empty() {
            errors.push(FieldError::new("father", "at least one of father, mother or children is required"));
        }
        errors
    }
}

impl Resource for Family {
    const COLLECTION: Collection = Collection::Families;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] =
        &[("familyName", "familyName"), ("localChurch", "localChurch")];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requires_at_least_one_member() {
        let family: Family = serde_json::from_value(json!({
            "familyName": "Santos",
            "localChurch": Uuid::new_v4()
        }))
        .unwrap();
        assert_eq!(family.validate(Operation::Create).len(), 1);

        let child = Uuid::new_v4();
        let family: Family = serde_json::from_value(json!({
            "familyName": "Santos",
            "children": [child, child],
            "localChurch": Uuid::new_v4()
        }))
        .unwrap();
        assert!(family.validate(Operation::Create).is_empty());
        assert_eq!(family.member_ids(), vec![child]);
    }

    #[test]
    fn null_children_read_as_none() {
        let father = Uuid::new_v4();
        let family: Family = serde_json::from_value(json!({
            "familyName": "Santos",
            "father": father,
            "children": null,
            "localChurch": Uuid::new_v4()
        }))
        .unwrap();
        assert!(family.children.is_empty());
        assert_eq!(family.member_ids(), vec![father]);
    }
}
