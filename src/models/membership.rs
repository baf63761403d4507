use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{check_email, check_mobile_number, date, id_list, require_text};
use super::{FieldError, Resource, Validate};
use crate::filter::FilterData;
use crate::types::{Collection, Operation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barangay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent: Option<PostalAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PostalAddress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CivilStatus {
    Single,
    Married,
    Widowed,
    Separated,
    Annulled,
}

/// Baptism or confirmation record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sacrament {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minister: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church: Option<String>,
}

impl Sacrament {
    pub fn is_recorded(&self) -> bool {
        self.year.is_some() || self.minister.as_deref().is_some_and(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Organization {
    #[serde(rename = "UMM")]
    Umm,
    #[serde(rename = "UMWSCS")]
    Umwscs,
    #[serde(rename = "UMYAF")]
    Umyaf,
    #[serde(rename = "UMYF")]
    Umyf,
    #[serde(rename = "UMCF")]
    Umcf,
}

impl Organization {
    pub fn for_member(age: i32, gender: Gender) -> Self {
        match age {
            a if a > 40 => match gender {
                Gender::Male => Organization::Umm,
                Gender::Female => Organization::Umwscs,
            },
            a if a > 24 => Organization::Umyaf,
            a if a > 12 => Organization::Umyf,
            _ => Organization::Umcf,
        }
    }
}

/// Fields recomputed on every save; client-supplied values are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFields {
    pub age: i32,
    pub organization: Organization,
    pub is_baptized: bool,
    pub is_confirmed: bool,
}

/// Full years between `birthday` and `today`
pub fn age_on(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthday.year();
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        age -= 1;
    }
    age
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub name: PersonName,
    #[serde(default)]
    pub address: MemberAddress,
    pub gender: Gender,
    pub civil_status: CivilStatus,
    #[serde(deserialize_with = "date::deserialize")]
    pub birthday: NaiveDate,
    #[serde(default)]
    pub baptism: Sacrament,
    #[serde(default)]
    pub confirmation: Sacrament,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<Uuid>,
    #[serde(default, deserialize_with = "id_list::deserialize")]
    pub children: Vec<Uuid>,
    pub local_church: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

impl Membership {
    pub fn derive(&self, today: NaiveDate) -> DerivedFields {
        let age = age_on(self.birthday, today);
        DerivedFields {
            age,
            organization: Organization::for_member(age, self.gender),
            is_baptized: self.baptism.is_recorded(),
            is_confirmed: self.confirmation.is_recorded(),
        }
    }
}

impl Validate for Membership {
    fn validate(&self, _operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "name.firstName", &self.name.first_name);
        require_text(&mut errors, "name.lastName", &self.name.last_name);
        if self.birthday > chrono::Utc::now().date_naive() {
            errors.push(FieldError::new("birthday", "cannot be in the future"));
        }
        check_mobile_number(&mut errors, "contactNo", self.contact_no.as_deref());
        if let Some(email) = &self.email {
            check_email(&mut errors, "email", email);
        }
        errors
    }
}

impl Resource for Membership {
    const COLLECTION: Collection = Collection::Memberships;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[
        ("gender", "gender"),
        ("civilStatus", "civilStatus"),
        ("organization", "organization"),
        ("isBaptized", "isBaptized"),
        ("isConfirmed", "isConfirmed"),
        ("localChurch", "localChurch"),
    ];

    fn extra_filter(filter: FilterData, params: &HashMap<String, String>) -> FilterData {
        match params.get("search").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(needle) => filter.where_search(&["name.firstName", "name.lastName"], needle),
            None => filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(birthday: &str, gender: &str) -> Membership {
        serde_json::from_value(json!({
            "name": {"firstName": "Juan", "lastName": "Dela Cruz"},
            "gender": gender,
            "civilStatus": "single",
            "birthday": birthday,
            "localChurch": Uuid::new_v4(),
        }))
        .unwrap()
    }

    #[test]
    fn age_counts_full_years() {
        assert_eq!(age_on(ymd(1990, 6, 15), ymd(2024, 6, 14)), 33);
        assert_eq!(age_on(ymd(1990, 6, 15), ymd(2024, 6, 15)), 34);
        assert_eq!(age_on(ymd(2000, 2, 29), ymd(2024, 2, 28)), 23);
    }

    #[test]
    fn organization_bands() {
        assert_eq!(Organization::for_member(41, Gender::Male), Organization::Umm);
        assert_eq!(Organization::for_member(41, Gender::Female), Organization::Umwscs);
        assert_eq!(Organization::for_member(40, Gender::Male), Organization::Umyaf);
        assert_eq!(Organization::for_member(25, Gender::Female), Organization::Umyaf);
        assert_eq!(Organization::for_member(24, Gender::Male), Organization::Umyf);
        assert_eq!(Organization::for_member(13, Gender::Male), Organization::Umyf);
        assert_eq!(Organization::for_member(12, Gender::Female), Organization::Umcf);
        assert_eq!(Organization::for_member(0, Gender::Female), Organization::Umcf);
    }

    #[test]
    fn derived_fields_are_stable_and_follow_baptism() {
        let today = ymd(2024, 3, 1);
        let mut m = member("1980-01-10", "female");
        let first = m.derive(today);
        assert_eq!(first, m.derive(today));
        assert_eq!(first.age, 44);
        assert_eq!(first.organization, Organization::Umwscs);
        assert!(!first.is_baptized);

        m.baptism.year = Some(1981);
        let second = m.derive(today);
        assert!(second.is_baptized);
        assert!(!second.is_confirmed);

        m.baptism = Sacrament::default();
        m.confirmation.minister = Some("Rev. Santos".into());
        let third = m.derive(today);
        assert!(!third.is_baptized);
        assert!(third.is_confirmed);
    }

    #[test]
    fn organization_serializes_as_code() {
        assert_eq!(serde_json::to_value(Organization::Umwscs).unwrap(), "UMWSCS");
    }

    #[test]
    fn client_derived_fields_are_dropped() {
        let m: Membership = serde_json::from_value(json!({
            "name": {"firstName": "Ana", "lastName": "Reyes"},
            "gender": "female",
            "civilStatus": "married",
            "birthday": "1995-05-05",
            "localChurch": Uuid::new_v4(),
            "age": 99,
            "isBaptized": true
        }))
        .unwrap();
        let value = serde_json::to_value(&m).unwrap();
        assert!(value.get("age").is_none());
        assert!(value.get("isBaptized").is_none());
    }
}
