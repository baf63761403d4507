use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

use super::FieldError;

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp; serializes back as `YYYY-MM-DD`.
pub mod date {
    use super::*;

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
            }
        }
    }
}

/// Optional id lists: `null` reads the same as an absent field
pub mod id_list {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

pub fn require_text(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "is required"));
    }
}

/// Philippine mobile number: `09` followed by nine digits
pub fn is_mobile_number(value: &str) -> bool {
    value.len() == 11 && value.starts_with("09") && value.chars().all(|c| c.is_ascii_digit())
}

pub fn check_mobile_number(errors: &mut Vec<FieldError>, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !is_mobile_number(value) {
            errors.push(FieldError::new(field, "must be a mobile number like 09171234567"));
        }
    }
}

pub fn check_email(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !valid {
        errors.push(FieldError::new(field, "must be a valid email address"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamp_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date::parse("2024-01-01"), Some(expected));
        assert_eq!(date::parse("2024-01-01T00:00:00.000Z"), Some(expected));
        assert_eq!(date::parse("01/01/2024"), None);
    }

    #[test]
    fn mobile_number_format() {
        assert!(is_mobile_number("09171234567"));
        assert!(!is_mobile_number("0917123456"));
        assert!(!is_mobile_number("08171234567"));
        assert!(!is_mobile_number("0917123456a"));
    }

    #[test]
    fn email_format() {
        let mut errors = vec![];
        check_email(&mut errors, "email", "pastor@umc.ph");
        assert!(errors.is_empty());
        check_email(&mut errors, "email", "pastor.umc.ph");
        check_email(&mut errors, "email", "@umc.ph");
        assert_eq!(errors.len(), 2);
    }
}
