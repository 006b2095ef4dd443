//! Collapsing of the remote "absent / single / many" result convention.
//!
//! The service serializes a one-element list as a bare object and an empty
//! list by omitting the field. Every list-valued result passes through
//! [`normalize`] before it reaches a caller.

use serde_json::Value;

/// Turn an absent, single or array value into an ordered sequence.
///
/// - `None` or `null` becomes an empty vector.
/// - An array is returned unchanged.
/// - Anything else becomes a one-element vector.
pub fn normalize(value: Option<Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(single) => vec![single],
    }
}

/// Descend `path` from `value`, then [`normalize`].
///
/// A missing or null step yields an empty sequence.
pub fn normalize_at(value: Option<Value>, path: &[&str]) -> Vec<Value> {
    normalize(descend(value, path))
}

/// Take the value at `path`, consuming the parent.
pub fn descend(value: Option<Value>, path: &[&str]) -> Option<Value> {
    path.iter().try_fold(value?, |current, key| match current {
        Value::Object(mut map) => map.remove(*key),
        _ => None,
    })
}

/// Remove the `<operation>Result` field from a response object.
pub fn take_result(mut response: Value, operation: &str) -> Option<Value> {
    response
        .as_object_mut()?
        .remove(&result_field(operation))
        .filter(|value| !value.is_null())
}

/// Name of the payload field in an operation's response.
pub fn result_field(operation: &str) -> String {
    format!("{}Result", operation)
}

/// Loose truthiness of a remote scalar, used for identifier checks.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Compare a remote identifier (number or numeric string) with a local one.
pub(crate) fn id_matches(value: Option<&Value>, id: i64) -> bool {
    match value {
        Some(Value::Number(n)) => n.as_i64() == Some(id),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok() == Some(id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_absent() {
        assert!(normalize(None).is_empty());
        assert!(normalize(Some(Value::Null)).is_empty());
    }

    #[test]
    fn test_normalize_single() {
        let company = json!({"ID": "1", "Number": "5"});
        assert_eq!(normalize(Some(company.clone())), vec![company]);
    }

    #[test]
    fn test_normalize_array_identity() {
        let items = vec![json!({"ID": 3}), json!({"ID": 1}), json!({"ID": 2})];
        assert_eq!(normalize(Some(Value::Array(items.clone()))), items);
        assert!(normalize(Some(json!([]))).is_empty());
    }

    #[test]
    fn test_normalize_scalar() {
        assert_eq!(normalize(Some(json!("abc"))), vec![json!("abc")]);
    }

    #[test]
    fn test_normalize_at_nested() {
        let result = json!({"Company": [{"ID": 1}, {"ID": 2}]});
        assert_eq!(normalize_at(Some(result), &["Company"]).len(), 2);

        let result = json!({"Company": {"ID": 1}});
        assert_eq!(normalize_at(Some(result), &["Company"]), vec![json!({"ID": 1})]);

        assert!(normalize_at(Some(json!({})), &["Company"]).is_empty());
        assert!(normalize_at(None, &["Company"]).is_empty());
        assert!(normalize_at(Some(json!("text")), &["Company"]).is_empty());
    }

    #[test]
    fn test_take_result() {
        let response = json!({"List_GetAllResult": {"Company": []}});
        assert_eq!(
            take_result(response, "List_GetAll"),
            Some(json!({"Company": []}))
        );
        assert_eq!(take_result(json!({"List_GetAllResult": null}), "List_GetAll"), None);
        assert_eq!(take_result(json!({}), "List_GetAll"), None);
    }

    #[test]
    fn test_id_matches() {
        assert!(id_matches(Some(&json!(12)), 12));
        assert!(id_matches(Some(&json!("12")), 12));
        assert!(!id_matches(Some(&json!("12a")), 12));
        assert!(!id_matches(None, 12));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!("15")));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&Value::Null));
    }
}
