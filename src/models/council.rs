//! Church council: a term-bound roster of role assignments across seven committees.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::date;
use super::{FieldError, Resource, Validate};
use crate::types::{Collection, Operation};

/// Required single-member slots and optional member lists of one committee
#[derive(Debug, Clone, Copy)]
pub struct CommitteeRoster {
    pub name: &'static str,
    pub slots: &'static [&'static str],
    pub lists: &'static [&'static str],
}

pub const ROSTER: &[CommitteeRoster] = &[
    CommitteeRoster {
        name: "administrativeOffice",
        slots: &[
            "chairperson",
            "viceChairperson",
            "councilSecretary",
            "layLeader",
            "assistantLayLeader",
            "recordingSecretary",
            "membershipSecretary",
            "trusteeChairperson",
            "staffParishChairperson",
        ],
        lists: &["trustees", "staffParishMembers", "layServants"],
    },
    CommitteeRoster {
        name: "nurture",
        slots: &[
            "chairperson",
            "christianEducationCoordinator",
            "worshipCoordinator",
            "childrenCoordinator",
            "youthCoordinator",
            "youngAdultCoordinator",
        ],
        lists: &["members"],
    },
    CommitteeRoster {
        name: "outreach",
        slots: &[
            "chairperson",
            "missionsCoordinator",
            "socialConcernsCoordinator",
            "healthAndWelfareCoordinator",
            "stewardshipCoordinator",
        ],
        lists: &["members"],
    },
    CommitteeRoster {
        name: "witness",
        slots: &[
            "chairperson",
            "evangelismCoordinator",
            "discipleshipCoordinator",
            "prayerMinistryCoordinator",
        ],
        lists: &["members"],
    },
    CommitteeRoster {
        name: "churchHistorian",
        slots: &["historian", "assistantHistorian"],
        lists: &[],
    },
    CommitteeRoster {
        name: "communications",
        slots: &["chairperson", "secretary", "mediaCoordinator", "publicationsCoordinator"],
        lists: &["members"],
    },
    CommitteeRoster {
        name: "finance",
        slots: &[
            "chairperson",
            "treasurer",
            "assistantTreasurer",
            "financialSecretary",
            "auditor",
        ],
        lists: &["members"],
    },
];

/// Minimum term length, in milliseconds (twelve 30-day months)
pub const MIN_TERM_MS: i64 = 12 * 30 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberSlot {
    One(Uuid),
    Many(Vec<Uuid>),
}

pub type Committee = BTreeMap<String, MemberSlot>;

/// A null or missing committee is empty, and a null role is vacant
mod committee {
    use super::*;
    use serde::Deserializer;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Committee, D::Error> {
        let roles = Option::<BTreeMap<String, Option<MemberSlot>>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(roles
            .into_iter()
            .filter_map(|(role, slot)| slot.map(|slot| (role, slot)))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Council {
    #[serde(deserialize_with = "date::deserialize")]
    pub start_year: NaiveDate,
    #[serde(deserialize_with = "date::deserialize")]
    pub end_year: NaiveDate,
    pub local_church: Uuid,
    #[serde(default, deserialize_with = "committee::deserialize")]
    pub administrative_office: Committee,
    #[serde(default, deserialize_with = "committee::deserialize")]
    pub nurture: Committee,
    #[serde(default, deserialize_with = "committee::deserialize")]
    pub outreach: Committee,
    #[serde(default, deserialize_with = "committee::deserialize")]
    pub witness: Committee,
    #[serde(default, deserialize_with = "committee::deserialize")]
    pub church_historian: Committee,
    #[serde(default, deserialize_with = "committee::deserialize")]
    pub communications: Committee,
    #[serde(default, deserialize_with = "committee::deserialize")]
    pub finance: Committee,
}

impl Council {
    fn committee(&self, name: &str) -> Option<&Committee> {
        match name {
            "administrativeOffice" => Some(&self.administrative_office),
            "nurture" => Some(&self.nurture),
            "outreach" => Some(&self.outreach),
            "witness" => Some(&self.witness),
            "churchHistorian" => Some(&self.church_historian),
            "communications" => Some(&self.communications),
            "finance" => Some(&self.finance),
            _ => None,
        }
    }

    /// Every referenced member, deduplicated
    pub fn member_ids(&self) -> BTreeSet<Uuid> {
        let mut ids = BTreeSet::new();
        for roster in ROSTER {
            let Some(committee) = self.committee(roster.name) else { continue };
            for slot in committee.values() {
                match slot {
                    MemberSlot::One(id) => {
                        ids.insert(*id);
                    }
                    MemberSlot::Many(list) => ids.extend(list.iter().copied()),
                }
            }
        }
        ids
    }

    /// Term check: end strictly after start by at least [`MIN_TERM_MS`]
    pub fn term_is_valid(&self) -> bool {
        let elapsed = self.end_year.signed_duration_since(self.start_year).num_milliseconds();
        elapsed > 0 && elapsed >= MIN_TERM_MS
    }
}

impl Validate for Council {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        for roster in ROSTER {
            let Some(committee) = self.committee(roster.name) else { continue };
            for slot in roster.slots {
                match committee.get(*slot) {
                    Some(MemberSlot::One(_)) => {}
                    Some(MemberSlot::Many(_)) => {
                        errors.push(FieldError::new(format!("{}.{}", roster.name, slot), "must be a single member id"))
                    }
                    None => errors.push(FieldError::new(format!("{}.{}", roster.name, slot), "is required")),
                }
            }
            for list in roster.lists {
                if let Some(MemberSlot::One(_)) = committee.get(*list) {
                    errors.push(FieldError::new(format!("{}.{}", roster.name, list), "must be a list of member ids"));
                }
            }
            for field in committee.keys() {
                if !roster.slots.contains(&field.as_str()) && !roster.lists.contains(&field.as_str()) {
                    errors.push(FieldError::new(format!("{}.{}", roster.name, field), "is not a role of this committee"));
                }
            }
        }
        errors
    }
}

impl Resource for Council {
    const COLLECTION: Collection = Collection::Councils;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[("localChurch", "localChurch")];
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    /// A council body with every slot filled from `members` (cycled)
    pub(crate) fn council_body(church: Uuid, members: &[Uuid], start: &str, end: &str) -> Value {
        let mut next = members.iter().cycle();
        let mut body = Map::new();
        body.insert("startYear".into(), json!(start));
        body.insert("endYear".into(), json!(end));
        body.insert("localChurch".into(), json!(church));
        for roster in ROSTER {
            let mut committee = Map::new();
            for slot in roster.slots {
                committee.insert(slot.to_string(), json!(next.next()));
            }
            for list in roster.lists {
                committee.insert(list.to_string(), json!([next.next()]));
            }
            body.insert(roster.name.to_string(), Value::Object(committee));
        }
        Value::Object(body)
    }

    #[test]
    fn roster_has_expected_shape() {
        assert_eq!(ROSTER.len(), 7);
        let slots: usize = ROSTER.iter().map(|c| c.slots.len()).sum();
        let lists: usize = ROSTER.iter().map(|c| c.lists.len()).sum();
        assert_eq!(slots, 35);
        assert_eq!(lists, 8);
    }

    #[test]
    fn term_boundary_follows_thirty_day_months() {
        let members = [Uuid::new_v4()];
        let church = Uuid::new_v4();
        let short: Council =
            serde_json::from_value(council_body(church, &members, "2024-01-01", "2024-06-01")).unwrap();
        assert!(!short.term_is_valid());

        let year: Council =
            serde_json::from_value(council_body(church, &members, "2024-01-01", "2025-01-01")).unwrap();
        assert!(year.term_is_valid());

        // 360 days is the exact boundary
        let exact: Council =
            serde_json::from_value(council_body(church, &members, "2024-01-01", "2024-12-26")).unwrap();
        assert!(exact.term_is_valid());
        let below: Council =
            serde_json::from_value(council_body(church, &members, "2024-01-01", "2024-12-25")).unwrap();
        assert!(!below.term_is_valid());

        let backwards: Council =
            serde_json::from_value(council_body(church, &members, "2025-01-01", "2024-01-01")).unwrap();
        assert!(!backwards.term_is_valid());
    }

    #[test]
    fn member_ids_are_flattened_and_deduplicated() {
        let members: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let council: Council =
            serde_json::from_value(council_body(Uuid::new_v4(), &members, "2024-01-01", "2025-01-01")).unwrap();
        assert_eq!(council.member_ids(), members.iter().copied().collect());
        assert!(council.validate(Operation::Create).is_empty());
    }

    #[test]
    fn missing_slots_and_unknown_roles_are_reported() {
        let mut body = council_body(Uuid::new_v4(), &[Uuid::new_v4()], "2024-01-01", "2025-01-01");
        body["finance"].as_object_mut().unwrap().remove("treasurer");
        body["witness"]["bishop"] = json!(Uuid::new_v4());
        let council: Council = serde_json::from_value(body).unwrap();

        let errors = council.validate(Operation::Create);
        assert!(errors.contains(&FieldError::new("finance.treasurer", "is required")));
        assert!(errors.contains(&FieldError::new("witness.bishop", "is not a role of this committee")));
    }

    #[test]
    fn null_roles_read_as_vacant() {
        let member = Uuid::new_v4();
        let mut body = council_body(Uuid::new_v4(), &[member], "2024-01-01", "2025-01-01");
        body["administrativeOffice"]["trustees"] = Value::Null;
        body["finance"]["treasurer"] = Value::Null;
        body["churchHistorian"] = Value::Null;
        let council: Council = serde_json::from_value(body).unwrap();

        assert!(!council.administrative_office.contains_key("trustees"));
        assert_eq!(council.member_ids(), [member].into_iter().collect());
        let errors = council.validate(Operation::Create);
        assert_eq!(
            errors,
            vec![
                FieldError::new("churchHistorian.historian", "is required"),
                FieldError::new("churchHistorian.assistantHistorian", "is required"),
                FieldError::new("finance.treasurer", "is required"),
            ]
        );
    }
}
