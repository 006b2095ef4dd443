//! SOAP response parsing.
//!
//! Uses quick-xml, which does not expand external entities. Replies are
//! converted into a loose JSON tree the same way the remote service's
//! classic SOAP consumers see them: leaf elements become strings, empty or
//! `xsi:nil` elements become null, and repeated siblings become arrays.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::CallError;

/// One open element while building the tree.
#[derive(Debug, Default)]
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
    has_children: bool,
    nil: bool,
}

impl Frame {
    fn open(e: &BytesStart) -> Self {
        Self {
            name: local_name_str(e),
            nil: is_nil(e),
            ..Default::default()
        }
    }

    fn into_value(self) -> Value {
        if self.has_children {
            Value::Object(self.children)
        } else if self.nil || self.text.is_empty() {
            Value::Null
        } else {
            Value::String(self.text)
        }
    }

    fn insert(&mut self, name: String, value: Value) {
        self.has_children = true;
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }
}

/// Parse raw bytes into an element tree rooted at a synthetic document node.
pub fn parse_xml_tree(data: &[u8]) -> Result<Value, CallError> {
    let xml_str = std::str::from_utf8(data)
        .map_err(|e| CallError::Malformed(format!("Invalid UTF-8: {}", e)))?;

    check_xxe_patterns(xml_str)?;

    let mut reader = Reader::from_str(xml_str);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Frame::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(Frame::open(e)),

            Ok(Event::Empty(ref e)) => {
                let frame = Frame::open(e);
                let name = frame.name.clone();
                if let Some(parent) = stack.last_mut() {
                    parent.insert(name, frame.into_value());
                }
            }

            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(CallError::Malformed("Unbalanced closing tag".to_string()));
                }
                if let Some(frame) = stack.pop() {
                    let name = frame.name.clone();
                    if let Some(parent) = stack.last_mut() {
                        parent.insert(name, frame.into_value());
                    }
                }
            }

            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| CallError::Malformed(format!("XML parse error: {}", e)))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }

            Ok(Event::CData(ref e)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(e));
                }
            }

            Ok(Event::DocType(_)) => {
                return Err(CallError::Malformed(
                    "DOCTYPE declarations are not allowed".to_string(),
                ));
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(CallError::Malformed(format!("XML parse error: {}", e)));
            }

            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(CallError::Malformed("Unexpected end of document".to_string()));
    }
    Ok(stack
        .pop()
        .map(|root| Value::Object(root.children))
        .unwrap_or(Value::Null))
}

/// Parse a SOAP reply and return the `<operation>Response` element.
///
/// A SOAP Fault becomes [`CallError::Fault`] carrying the fault text.
pub fn parse_response(data: &[u8], operation: &str) -> Result<Value, CallError> {
    let mut tree = parse_xml_tree(data)?;

    let mut body = tree
        .get_mut("Envelope")
        .and_then(|envelope| envelope.get_mut("Body"))
        .map(Value::take)
        .ok_or_else(|| CallError::Malformed("No SOAP Envelope/Body in response".to_string()))?;

    if let Some(fault) = body.get("Fault") {
        return Err(CallError::Fault(fault_message(fault)));
    }

    let response_name = format!("{}Response", operation);
    match body.get_mut(&response_name).map(Value::take) {
        Some(Value::Null) => Ok(Value::Object(Map::new())),
        Some(response @ Value::Object(_)) => Ok(response),
        Some(other) => Err(CallError::Malformed(format!(
            "Unexpected {} content: {}",
            response_name, other
        ))),
        None => Err(CallError::Malformed(format!(
            "No {} element in SOAP Body",
            response_name
        ))),
    }
}

/// Whether a document looks like a WSDL service description.
pub fn is_wsdl_document(data: &[u8]) -> bool {
    let Ok(xml_str) = std::str::from_utf8(data) else {
        return false;
    };
    if check_xxe_patterns(xml_str).is_err() {
        return false;
    }

    let mut reader = Reader::from_str(xml_str);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                return local_name_str(e) == "definitions";
            }
            Ok(Event::Eof) | Err(_) => return false,
            _ => {}
        }
    }
}

/// Fault text for SOAP 1.1 (`faultstring`) or 1.2 (`Reason/Text`).
fn fault_message(fault: &Value) -> String {
    let text = fault
        .get("faultstring")
        .or_else(|| fault.get("Reason").and_then(|reason| reason.get("Text")));
    match text {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .next()
            .unwrap_or_default()
            .to_string(),
        _ => "SOAP Fault without message".to_string(),
    }
}

/// Reject DOCTYPE and entity declarations in the prolog.
///
/// Only the text before the root element is scanned, so CDATA payloads
/// carrying whole XML documents pass.
fn check_xxe_patterns(xml: &str) -> Result<(), CallError> {
    let prolog = &xml[..root_start(xml)];

    if prolog.contains("<!DOCTYPE") || prolog.contains("<!doctype") {
        return Err(CallError::Malformed(
            "DOCTYPE declarations are not allowed".to_string(),
        ));
    }

    if prolog.contains("<!ENTITY") || prolog.contains("<!entity") {
        return Err(CallError::Malformed(
            "Entity declarations are not allowed".to_string(),
        ));
    }

    Ok(())
}

/// Byte offset of the root element's opening `<`, or the length of `xml`.
fn root_start(xml: &str) -> usize {
    xml.as_bytes()
        .windows(2)
        .position(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'_'))
        .unwrap_or(xml.len())
}

/// Extract local name from element.
fn local_name_str(e: &BytesStart) -> String {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .unwrap_or("")
        .to_string()
}

/// Check the `xsi:nil` attribute.
fn is_nil(e: &BytesStart) -> bool {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"nil" {
            let value = std::str::from_utf8(&attr.value).unwrap_or("");
            return value == "true" || value == "1";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LIST_MANY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Body>
    <List_GetAllResponse xmlns="https://api.nmbrs.nl/soap/v3/CompanyService">
      <List_GetAllResult>
        <Company><ID>1</ID><Number>5</Number><Name>Acme &amp; Zn</Name></Company>
        <Company><ID>2</ID><Number>12</Number><Name>Globex</Name></Company>
      </List_GetAllResult>
    </List_GetAllResponse>
  </soap:Body>
</soap:Envelope>"#;

    const LIST_ONE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <List_GetAllResponse xmlns="https://api.nmbrs.nl/soap/v3/CompanyService">
      <List_GetAllResult>
        <Company><ID>1</ID><Number>5</Number><Name>Acme</Name></Company>
      </List_GetAllResult>
    </List_GetAllResponse>
  </soap:Body>
</soap:Envelope>"#;

    const LIST_EMPTY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <List_GetAllResponse xmlns="https://api.nmbrs.nl/soap/v3/CompanyService">
      <List_GetAllResult />
    </List_GetAllResponse>
  </soap:Body>
</soap:Envelope>"#;

    const FAULT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
      <faultstring>Server was unable to process request. ---&gt; 1002: Unauthorized</faultstring>
      <detail />
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn test_parse_many_becomes_array() {
        let response = parse_response(LIST_MANY.as_bytes(), "List_GetAll").unwrap();
        let companies = &response["List_GetAllResult"]["Company"];
        assert!(companies.is_array());
        assert_eq!(companies[1]["Number"], json!("12"));
        assert_eq!(companies[0]["Name"], json!("Acme & Zn"));
    }

    #[test]
    fn test_parse_one_stays_object() {
        let response = parse_response(LIST_ONE.as_bytes(), "List_GetAll").unwrap();
        assert!(response["List_GetAllResult"]["Company"].is_object());
    }

    #[test]
    fn test_parse_empty_result_is_null() {
        let response = parse_response(LIST_EMPTY.as_bytes(), "List_GetAll").unwrap();
        assert_eq!(response["List_GetAllResult"], Value::Null);
    }

    #[test]
    fn test_parse_fault() {
        let err = parse_response(FAULT.as_bytes(), "List_GetAll").unwrap_err();
        assert_eq!(
            err,
            CallError::Fault(
                "Server was unable to process request. ---> 1002: Unauthorized".to_string()
            )
        );
    }

    #[test]
    fn test_parse_nil_and_scalar_result() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Body>
    <WageTax_GetXMLResponse xmlns="https://api.nmbrs.nl/soap/v3/CompanyService">
      <WageTax_GetXMLResult>&lt;xml/&gt;</WageTax_GetXMLResult>
      <Other xsi:nil="true" />
    </WageTax_GetXMLResponse>
  </soap:Body>
</soap:Envelope>"#;
        let response = parse_response(xml.as_bytes(), "WageTax_GetXML").unwrap();
        assert_eq!(response["WageTax_GetXMLResult"], json!("<xml/>"));
        assert_eq!(response["Other"], Value::Null);
    }

    #[test]
    fn test_parse_empty_response_element() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <Address_UpdateResponse xmlns="https://api.nmbrs.nl/soap/v3/CompanyService" />
  </soap:Body>
</soap:Envelope>"#;
        let response = parse_response(xml.as_bytes(), "Address_Update").unwrap();
        assert_eq!(response, json!({}));
    }

    #[test]
    fn test_parse_missing_response_element() {
        let err = parse_response(LIST_ONE.as_bytes(), "Run_GetList").unwrap_err();
        assert!(matches!(err, CallError::Malformed(_)));
    }

    #[test]
    fn test_xxe_rejected() {
        let xxe_payload = r#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>&xxe;</soap:Body>
</soap:Envelope>"#;
        let err = parse_response(xxe_payload.as_bytes(), "Op").unwrap_err();
        assert_eq!(
            err,
            CallError::Malformed("DOCTYPE declarations are not allowed".to_string())
        );
    }

    #[test]
    fn test_xml_document_inside_cdata() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <WageTax_GetXMLResponse xmlns="https://api.nmbrs.nl/soap/v3/CompanyService">
      <WageTax_GetXMLResult><![CDATA[<!DOCTYPE x><!ENTITY y "z"><x/>]]></WageTax_GetXMLResult>
    </WageTax_GetXMLResponse>
  </soap:Body>
</soap:Envelope>"#;
        let response = parse_response(xml.as_bytes(), "WageTax_GetXML").unwrap();
        assert_eq!(
            response["WageTax_GetXMLResult"],
            json!(r#"<!DOCTYPE x><!ENTITY y "z"><x/>"#)
        );
    }

    #[test]
    fn test_root_start() {
        assert_eq!(root_start(r#"<?xml version="1.0"?><!DOCTYPE a><a/>"#), 33);
        assert_eq!(root_start("<!-- note --><_x/>"), 13);
        assert_eq!(root_start("no markup"), 9);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_response(b"<soap:Envelope><soap:Body>", "Op"),
            Err(CallError::Malformed(_))
        ));
        assert!(matches!(
            parse_response(b"Service Unavailable", "Op"),
            Err(CallError::Malformed(_))
        ));
    }

    #[test]
    fn test_is_wsdl_document() {
        let wsdl = r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"><wsdl:types /></wsdl:definitions>"#;
        assert!(is_wsdl_document(wsdl.as_bytes()));
        assert!(!is_wsdl_document(b"<html><body>Not found</body></html>"));
        assert!(!is_wsdl_document(b""));
    }
}
