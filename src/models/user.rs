use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{check_email, require_text};
use super::{FieldError, Resource, Validate};
use crate::database::Document;
use crate::types::{Collection, Operation, Role};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub email: String,
    /// Plain text on input; replaced by its hash before storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_church: Option<Uuid>,
}

impl User {
    /// The scope reference matching the role
    pub fn scope(&self) -> Option<Uuid> {
        match self.role {
            Role::Annual => self.annual,
            Role::District => self.district,
            Role::Local => self.local_church,
            Role::Admin | Role::National => None,
        }
    }
}

impl Validate for User {
    fn validate(&self, operation: Operation) -> Vec<FieldError> {
        let mut errors = vec![];
        require_text(&mut errors, "username", &self.username);
        check_email(&mut errors, "email", &self.email);

        match &self.password {
            Some(password) if password.chars().count() < MIN_PASSWORD_LEN => {
                errors.push(FieldError::new("password", format!("must be at least {MIN_PASSWORD_LEN} characters")));
            }
            None if operation == Operation::Create => errors.push(FieldError::new("password", "is required")),
            _ => {}
        }

        // Exactly the scope reference matching the role
        let provided = [
            ("annual", self.annual.is_some()),
            ("district", self.district.is_some()),
            ("localChurch", self.local_church.is_some()),
        ];
        let expected = self.role.scope_field();
        for (field, present) in provided {
            if Some(field) == expected && !present {
                errors.push(FieldError::new(field, format!("is required for the {} role", self.role)));
            }
            if Some(field) != expected && present {
                errors.push(FieldError::new(field, format!("is not allowed for the {} role", self.role)));
            }
        }
        errors
    }
}

impl Resource for User {
    const COLLECTION: Collection = Collection::Users;
    const EQ_FILTERS: &'static [(&'static str, &'static str)] = &[("role", "role")];

    fn present(mut doc: Document) -> Document {
        doc.remove("password");
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: serde_json::Value) -> User {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn scope_reference_must_match_role() {
        let church = Uuid::new_v4();
        let ok = user(json!({
            "username": "secretary",
            "email": "secretary@grace.ph",
            "password": "longenough",
            "role": "local",
            "localChurch": church
        }));
        assert!(ok.validate(Operation::Create).is_empty());
        assert_eq!(ok.scope(), Some(church));

        let wrong = user(json!({
            "username": "secretary",
            "email": "secretary@grace.ph",
            "password": "longenough",
            "role": "district",
            "localChurch": church
        }));
        let fields: Vec<_> = wrong.validate(Operation::Create).into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["district", "localChurch"]);
    }

    #[test]
    fn password_required_on_create_only() {
        let admin = user(json!({"username": "root", "email": "root@umc.ph", "role": "admin"}));
        assert_eq!(admin.validate(Operation::Create).len(), 1);
        assert!(admin.validate(Operation::Update).is_empty());
    }

    #[test]
    fn password_is_never_presented() {
        let doc = json!({"username": "root", "password": "$argon2id$..."}).as_object().cloned().unwrap();
        assert!(User::present(doc).get("password").is_none());
    }
}
