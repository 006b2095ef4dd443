//! Typed records decoded from remote replies.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A company as returned by `List_GetAll` and `List_GetByDebtor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "ID", deserialize_with = "lenient_i64")]
    pub id: i64,

    #[serde(rename = "Number", default, deserialize_with = "lenient_i64")]
    pub number: i64,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    /// Remaining remote fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Company {
    /// Decode one normalized list item.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Accept integers delivered as JSON numbers, numeric strings or null (0).
///
/// XML replies carry every scalar as text.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("{} is not an integer", n))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("{:?} is not an integer", s))),
        other => Err(D::Error::custom(format!("expected integer, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_from_xml_strings() {
        let company = Company::from_value(json!({
            "ID": "101",
            "Number": "12",
            "Name": "Acme",
            "PhoneNumber": "0201234567",
        }))
        .unwrap();
        assert_eq!(company.id, 101);
        assert_eq!(company.number, 12);
        assert_eq!(company.name.as_deref(), Some("Acme"));
        assert_eq!(company.extra["PhoneNumber"], json!("0201234567"));
    }

    #[test]
    fn test_company_from_numbers_and_missing_fields() {
        let company = Company::from_value(json!({"ID": 7})).unwrap();
        assert_eq!(company.id, 7);
        assert_eq!(company.number, 0);
        assert_eq!(company.name, None);

        let company = Company::from_value(json!({"ID": "7", "Number": null})).unwrap();
        assert_eq!(company.number, 0);
    }

    #[test]
    fn test_company_rejects_bad_id() {
        assert!(Company::from_value(json!({"ID": "abc"})).is_err());
        assert!(Company::from_value(json!({"Name": "no id"})).is_err());
    }
}
