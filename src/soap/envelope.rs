//! SOAP 1.1 rpc/encoded envelopes
//!
//! Requests are written from `serde_json::Value` parts, responses are read
//! back into `serde_json::Value` so entities can decode them with serde.
//!
//! ```text
//! <SOAP-ENV:Envelope ...>
//!   <SOAP-ENV:Body>
//!     <ns1:GetAddressKeysByPostcode>
//!       <Postcode xsi:type="xsd:string">LS1 1AA</Postcode>
//!     </ns1:GetAddressKeysByPostcode>
//!   </SOAP-ENV:Body>
//! </SOAP-ENV:Envelope>
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

use crate::error::{DespatchError, DespatchResult};

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_ENC_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

// ============================================================================
// Encoding
// ============================================================================

/// Build a request envelope for `operation` with the given message parts.
///
/// Parts are written in order. `null` parts are left out entirely.
pub fn encode_request(
    namespace: &str,
    operation: &str,
    parts: &[(&str, Value)],
) -> DespatchResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut envelope = BytesStart::new("SOAP-ENV:Envelope");
    envelope.push_attribute(("xmlns:SOAP-ENV", SOAP_ENV_NS));
    envelope.push_attribute(("xmlns:SOAP-ENC", SOAP_ENC_NS));
    envelope.push_attribute(("xmlns:xsd", XSD_NS));
    envelope.push_attribute(("xmlns:xsi", XSI_NS));
    envelope.push_attribute(("xmlns:ns1", namespace));
    envelope.push_attribute(("SOAP-ENV:encodingStyle", SOAP_ENC_NS));
    write(&mut writer, Event::Start(envelope))?;
    write(&mut writer, Event::Start(BytesStart::new("SOAP-ENV:Body")))?;

    let op_name = format!("ns1:{}", operation);
    write(&mut writer, Event::Start(BytesStart::new(op_name.as_str())))?;
    for (name, value) in parts {
        write_value(&mut writer, name, value)?;
    }
    write(&mut writer, Event::End(BytesEnd::new(op_name.as_str())))?;

    write(&mut writer, Event::End(BytesEnd::new("SOAP-ENV:Body")))?;
    write(&mut writer, Event::End(BytesEnd::new("SOAP-ENV:Envelope")))?;

    Ok(writer.into_inner())
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> DespatchResult<()> {
    writer
        .write_event(event)
        .map_err(|e| DespatchError::Encode(e.to_string()))
}

fn write_leaf(writer: &mut Writer<Vec<u8>>, name: &str, xsi_type: &str, text: &str) -> DespatchResult<()> {
    let mut start = BytesStart::new(name);
    start.push_attribute(("xsi:type", xsi_type));
    write(writer, Event::Start(start))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> DespatchResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Bool(b) => write_leaf(writer, name, "xsd:boolean", if *b { "true" } else { "false" }),
        Value::Number(n) if n.is_i64() || n.is_u64() => write_leaf(writer, name, "xsd:int", &n.to_string()),
        Value::Number(n) => write_leaf(writer, name, "xsd:float", &n.to_string()),
        Value::String(s) => write_leaf(writer, name, "xsd:string", s),
        Value::Array(items) => {
            let array_type = format!("xsd:anyType[{}]", items.len());
            let mut start = BytesStart::new(name);
            start.push_attribute(("xsi:type", "SOAP-ENC:Array"));
            start.push_attribute(("SOAP-ENC:arrayType", array_type.as_str()));
            write(writer, Event::Start(start))?;
            for item in items {
                write_value(writer, "item", item)?;
            }
            write(writer, Event::End(BytesEnd::new(name)))
        }
        Value::Object(fields) => {
            write(writer, Event::Start(BytesStart::new(name)))?;
            for (key, field) in fields {
                write_value(writer, key, field)?;
            }
            write(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Parsed XML element; names and attribute keys are namespace-local
#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Local part of `xsi:type`, e.g. "int" for "xsd:int"
    fn xsi_type(&self) -> Option<&str> {
        self.attr("type").map(|t| t.rsplit(':').next().unwrap_or(t))
    }

    fn is_array(&self) -> bool {
        self.attr("arrayType").is_some()
            || self.xsi_type().is_some_and(|t| t == "Array" || t.starts_with("ArrayOf"))
    }

    fn is_scalar_type(&self) -> bool {
        self.attr("type").is_some_and(|t| t.starts_with("xsd:") || t.starts_with("xs:"))
    }
}

fn local(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn start_node(start: &BytesStart<'_>) -> DespatchResult<Node> {
    let mut node = Node {
        name: local(start.local_name().as_ref()),
        ..Default::default()
    };
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DespatchError::Xml(e.to_string()))?;
        let key = local(attr.key.local_name().as_ref());
        let value = attr.unescape_value()?.into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

fn parse_tree(body: &str) -> DespatchResult<Node> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(start_node(&e)?),
            Event::Empty(e) => {
                let node = start_node(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| DespatchError::Xml("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DespatchError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| DespatchError::Xml("empty document".to_string()))
}

fn scalar(node: &Node) -> Value {
    let text = node.text.as_str();
    match node.xsi_type() {
        Some("int" | "integer" | "long" | "short" | "byte" | "unsignedInt" | "unsignedLong") => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        Some("float" | "double" | "decimal") => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        Some("boolean") => match text.trim() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        _ => Value::String(text.to_string()),
    }
}

fn to_value(node: &Node) -> Value {
    if node.attr("nil") == Some("true") {
        return Value::Null;
    }
    if node.is_array() {
        return Value::Array(node.children.iter().map(to_value).collect());
    }
    if node.children.is_empty() {
        // An empty element carries no data unless it is typed as a scalar
        if node.text.is_empty() && !node.is_scalar_type() {
            return Value::Null;
        }
        return scalar(node);
    }
    if node.children.iter().all(|c| c.name == "item") {
        return Value::Array(node.children.iter().map(to_value).collect());
    }

    let mut fields = Map::new();
    let mut folded: HashSet<&str> = HashSet::new();
    for child in &node.children {
        let value = to_value(child);
        match fields.get_mut(&child.name) {
            None => {
                fields.insert(child.name.clone(), value);
            }
            Some(existing) => {
                if folded.insert(child.name.as_str()) {
                    let first = existing.take();
                    *existing = Value::Array(vec![first]);
                }
                if let Value::Array(items) = existing {
                    items.push(value);
                }
            }
        }
    }
    Value::Object(fields)
}

/// Decode a response envelope into the value of its return part.
///
/// A `Fault` in the body becomes [`DespatchError::SoapFault`]. Operations
/// with no return part decode to `Value::Null`.
pub fn decode_response(body: &[u8]) -> DespatchResult<Value> {
    let text = std::str::from_utf8(body).map_err(|e| DespatchError::Xml(e.to_string()))?;
    let envelope = parse_tree(text)?;
    if envelope.name != "Envelope" {
        return Err(DespatchError::Xml(format!("expected Envelope, found {}", envelope.name)));
    }

    let soap_body = envelope
        .child("Body")
        .ok_or_else(|| DespatchError::Xml("envelope has no Body".to_string()))?;

    let response = match soap_body.children.first() {
        Some(node) => node,
        None => return Ok(Value::Null),
    };

    if response.name == "Fault" {
        let text_of = |name: &str| response.child(name).map(|n| n.text.clone()).unwrap_or_default();
        return Err(DespatchError::SoapFault {
            code: text_of("faultcode"),
            message: text_of("faultstring"),
        });
    }

    Ok(response.children.first().map(to_value).unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ns1="urn:test" xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:SOAP-ENC="http://schemas.xmlsoap.org/soap/encoding/">
  <SOAP-ENV:Body>{}</SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
            body
        )
    }

    #[test]
    fn test_encode_request_writes_typed_parts() {
        let xml = encode_request(
            "urn:test",
            "FindAddress",
            &[("Postcode", json!("LS1 1AA")), ("Property", json!("1"))],
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(xml.contains(r#"xmlns:ns1="urn:test""#));
        assert!(xml.contains("<ns1:FindAddress>"));
        assert!(xml.contains(r#"<Postcode xsi:type="xsd:string">LS1 1AA</Postcode>"#));
        assert!(xml.contains(r#"<Property xsi:type="xsd:string">1</Property>"#));
    }

    #[test]
    fn test_encode_escapes_text() {
        let xml = encode_request("urn:test", "Op", &[("Name", json!("Fish & Chips <Ltd>"))]).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("Fish &amp; Chips &lt;Ltd&gt;"));
    }

    #[test]
    fn test_encode_arrays_and_nested_objects() {
        let xml = encode_request(
            "urn:test",
            "BookShipments",
            &[
                ("ShipmentIDs", json!(["100-1", "100-2"])),
                ("Skipped", Value::Null),
                ("Parcel", json!({ "Weight": 1.5, "Count": 2, "Fragile": false })),
            ],
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(xml.contains(r#"SOAP-ENC:arrayType="xsd:anyType[2]""#));
        assert!(xml.contains(r#"<item xsi:type="xsd:string">100-1</item><item xsi:type="xsd:string">100-2</item>"#));
        assert!(!xml.contains("Skipped"));
        assert!(xml.contains(r#"<Weight xsi:type="xsd:float">1.5</Weight>"#));
        assert!(xml.contains(r#"<Count xsi:type="xsd:int">2</Count>"#));
        assert!(xml.contains(r#"<Fragile xsi:type="xsd:boolean">false</Fragile>"#));
    }

    #[test]
    fn test_decode_typed_struct() {
        let body = wrap(
            r#"<ns1:GetAccountResponse>
                 <return xsi:type="ns1:AccountType">
                   <AccountID xsi:type="xsd:int">42</AccountID>
                   <AccountName xsi:type="xsd:string">Acme</AccountName>
                   <AccountBalance xsi:type="ns1:AccountBalanceType">
                     <Balance xsi:type="xsd:float">10.5</Balance>
                     <AvailableBalance xsi:type="xsd:float">8</AvailableBalance>
                   </AccountBalance>
                 </return>
               </ns1:GetAccountResponse>"#,
        );

        let value = decode_response(body.as_bytes()).unwrap();
        assert_eq!(
            value,
            json!({
                "AccountID": 42,
                "AccountName": "Acme",
                "AccountBalance": { "Balance": 10.5, "AvailableBalance": 8.0 }
            })
        );
    }

    #[test]
    fn test_decode_array_keeps_order() {
        let body = wrap(
            r#"<ns1:GetAddressKeysByPostcodeResponse>
                 <return SOAP-ENC:arrayType="ns1:AddressKeyType[3]" xsi:type="SOAP-ENC:Array">
                   <item><Key>c</Key><Address>3 Road</Address></item>
                   <item><Key>a</Key><Address>1 Road</Address></item>
                   <item><Key>b</Key><Address>2 Road</Address></item>
                 </return>
               </ns1:GetAddressKeysByPostcodeResponse>"#,
        );

        let value = decode_response(body.as_bytes()).unwrap();
        let keys: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["Key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_decode_empty_array_and_nil() {
        let body = wrap(
            r#"<ns1:GetCollectionsResponse>
                 <return SOAP-ENC:arrayType="ns1:CollectionReturnType[0]" xsi:type="SOAP-ENC:Array"/>
               </ns1:GetCollectionsResponse>"#,
        );
        assert_eq!(decode_response(body.as_bytes()).unwrap(), json!([]));

        let body = wrap(
            r#"<ns1:GetShipmentResponse><return xsi:nil="true"/></ns1:GetShipmentResponse>"#,
        );
        assert_eq!(decode_response(body.as_bytes()).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_empty_untyped_elements_are_null() {
        let body = wrap(
            r#"<ns1:GetAccountResponse>
                 <return>
                   <AccountID>1</AccountID>
                   <AccountBalance/>
                   <AccountName></AccountName>
                   <Reference xsi:type="xsd:string"></Reference>
                 </return>
               </ns1:GetAccountResponse>"#,
        );
        let value = decode_response(body.as_bytes()).unwrap();
        assert_eq!(value["AccountID"], "1");
        assert_eq!(value["AccountBalance"], Value::Null);
        assert_eq!(value["AccountName"], Value::Null);
        assert_eq!(value["Reference"], "");

        let body = wrap("<ns1:GetAddressKeysByPostcodeResponse><return/></ns1:GetAddressKeysByPostcodeResponse>");
        assert_eq!(decode_response(body.as_bytes()).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_repeated_siblings_become_array() {
        let body = wrap(
            r#"<ns1:GetTrackingResponse>
                 <return>
                   <Event>one</Event>
                   <Event>two</Event>
                   <Event>three</Event>
                 </return>
               </ns1:GetTrackingResponse>"#,
        );
        let value = decode_response(body.as_bytes()).unwrap();
        assert_eq!(value["Event"], json!(["one", "two", "three"]));
    }

    #[test]
    fn test_decode_fault() {
        let body = wrap(
            r#"<SOAP-ENV:Fault>
                 <faultcode>SOAP-ENV:Client</faultcode>
                 <faultstring>Invalid shipment id</faultstring>
               </SOAP-ENV:Fault>"#,
        );

        match decode_response(body.as_bytes()) {
            Err(DespatchError::SoapFault { code, message }) => {
                assert_eq!(code, "SOAP-ENV:Client");
                assert_eq!(message, "Invalid shipment id");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_void_response() {
        let body = wrap("<ns1:CancelShipmentResponse/>");
        assert_eq!(decode_response(body.as_bytes()).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_rejects_non_soap() {
        assert!(matches!(decode_response(b"<html>oops</html>"), Err(DespatchError::Xml(_))));
        assert!(matches!(decode_response(b"<Envelope><Body>"), Err(DespatchError::Xml(_))));
    }
}
