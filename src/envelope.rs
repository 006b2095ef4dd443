//! SOAP 1.1 request construction.

use serde_json::{Map, Value};

use crate::error::CallError;
use crate::session::{AuthHeader, Endpoint, AUTH_HEADER_NAME};

/// SOAP 1.1 envelope namespace.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Build the request envelope for `operation`.
///
/// `args` must be an object (or null for parameterless operations). Keys
/// become child elements in insertion order, arrays become repeated elements
/// and nulls are omitted.
pub fn build_request(
    endpoint: &Endpoint,
    auth: &AuthHeader,
    operation: &str,
    args: &Value,
) -> Result<String, CallError> {
    let namespace = xml_escape(&endpoint.namespace());

    let mut body = String::new();
    match args {
        Value::Null => {}
        Value::Object(fields) => write_fields(&mut body, fields),
        other => {
            return Err(CallError::Malformed(format!(
                "arguments for {} must be an object, got {}",
                operation, other
            )))
        }
    }

    let header = auth
        .fields()
        .iter()
        .map(|(name, value)| format!("<{0}>{1}</{0}>", name, xml_escape(value)))
        .collect::<String>();

    Ok(format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="{soap}"
               xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
               xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <soap:Header>
    <{auth_name} xmlns="{ns}">{header}</{auth_name}>
  </soap:Header>
  <soap:Body>
    <{op} xmlns="{ns}">{body}</{op}>
  </soap:Body>
</soap:Envelope>"#,
        soap = SOAP_11_NS,
        auth_name = AUTH_HEADER_NAME,
        ns = namespace,
        header = header,
        op = operation,
        body = body,
    ))
}

fn write_fields(out: &mut String, fields: &Map<String, Value>) {
    for (name, value) in fields {
        write_element(out, name, value);
    }
}

fn write_element(out: &mut String, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                write_element(out, name, item);
            }
        }
        Value::Object(fields) => {
            out.push_str(&format!("<{}>", name));
            write_fields(out, fields);
            out.push_str(&format!("</{}>", name));
        }
        Value::Bool(b) => out.push_str(&format!("<{0}>{1}</{0}>", name, b)),
        Value::Number(n) => out.push_str(&format!("<{0}>{1}</{0}>", name, n)),
        Value::String(s) => out.push_str(&format!("<{0}>{1}</{0}>", name, xml_escape(s))),
    }
}

pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Service, PRODUCTION_BASE_URL};
    use serde_json::json;

    fn auth() -> AuthHeader {
        AuthHeader {
            username: "api@example.nl".to_string(),
            token: "t<ok>en".to_string(),
            domain: "example".to_string(),
        }
    }

    #[test]
    fn test_build_request_header_and_operation() {
        let endpoint = Endpoint::new(PRODUCTION_BASE_URL, Service::Company);
        let xml = build_request(&endpoint, &auth(), "List_GetAll", &Value::Null).unwrap();

        assert!(xml.contains(SOAP_11_NS));
        assert!(xml.contains(
            r#"<AuthHeaderWithDomain xmlns="https://api.nmbrs.nl/soap/v3/CompanyService">"#
        ));
        assert!(xml.contains("<Username>api@example.nl</Username>"));
        assert!(xml.contains("<Token>t&lt;ok&gt;en</Token>"));
        assert!(xml.contains("<Domain>example</Domain>"));
        assert!(xml.contains(
            r#"<List_GetAll xmlns="https://api.nmbrs.nl/soap/v3/CompanyService"></List_GetAll>"#
        ));
    }

    #[test]
    fn test_build_request_arguments_in_order() {
        let endpoint = Endpoint::new(PRODUCTION_BASE_URL, Service::Company);
        let args = json!({
            "Address": {"Street": "Kerkstraat & Co", "Id": 0, "Default": true},
            "CompanyId": 12,
            "Skipped": null,
        });
        let xml = build_request(&endpoint, &auth(), "Address_Insert", &args).unwrap();

        assert!(xml.contains(concat!(
            "<Address><Street>Kerkstraat &amp; Co</Street><Id>0</Id><Default>true</Default>",
            "</Address><CompanyId>12</CompanyId>"
        )));
        assert!(!xml.contains("Skipped"));
    }

    #[test]
    fn test_build_request_arrays_repeat() {
        let endpoint = Endpoint::new(PRODUCTION_BASE_URL, Service::Employee);
        let args = json!({"EmployeeIds": {"int": [1, 2]}});
        let xml = build_request(&endpoint, &auth(), "Op", &args).unwrap();
        assert!(xml.contains("<EmployeeIds><int>1</int><int>2</int></EmployeeIds>"));
    }

    #[test]
    fn test_build_request_rejects_scalar_args() {
        let endpoint = Endpoint::new(PRODUCTION_BASE_URL, Service::Report);
        let err = build_request(&endpoint, &auth(), "Op", &json!(5)).unwrap_err();
        assert!(matches!(err, CallError::Malformed(_)));
    }
}
