//! Reply parsing: XML into a small element tree, then envelope unwrapping.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::XmlError;

/// Deepest element nesting accepted in a reply. Tradera payloads stay
/// well under a dozen levels.
pub const MAX_DEPTH: usize = 256;

/// A parsed element. Names are local names, namespace prefixes dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search over descendants, excluding `self`.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Text of a child element, falling back to an attribute of the same name.
    /// The vendor mixes both shapes across operations.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|c| c.text.as_str())
            .or_else(|| self.attribute(name))
    }

    pub fn parse_of<T: FromStr>(&self, name: &str) -> Option<T> {
        self.text_of(name).and_then(|s| s.trim().parse().ok())
    }

    pub fn bool_of(&self, name: &str) -> Option<bool> {
        match self.text_of(name)?.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    pub fn string_of(&self, name: &str) -> Option<String> {
        self.text_of(name).map(|s| s.to_string())
    }

    /// Items of a list that may or may not be wrapped in a container element,
    /// e.g. `<Result><Categories><Category/>..</Categories></Result>` or
    /// `<Result><Category/>..</Result>`.
    pub fn list<'a>(&'a self, container: &str, item: &'a str) -> Vec<&'a XmlNode> {
        let source = self.child(container).unwrap_or(self);
        source.children_named(item).collect()
    }
}

/// SOAP fault contents (1.1 or 1.2 layout).
#[derive(Debug, Clone, PartialEq)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SoapReply {
    /// First element inside `<soap:Body>`, e.g. `<FetchTokenResponse>`.
    Body(XmlNode),
    Fault(SoapFault),
}

impl SoapReply {
    pub fn into_body(self) -> Result<XmlNode, SoapFault> {
        match self {
            SoapReply::Body(node) => Ok(node),
            SoapReply::Fault(fault) => Err(fault),
        }
    }
}

fn node_from_start(e: &BytesStart) -> Result<XmlNode, XmlError> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::Malformed(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let local = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Malformed(err.to_string()))?
            .into_owned();
        attributes.push((local, value));
    }
    Ok(XmlNode {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

/// Parse a complete XML document and return its root element.
/// DTDs are rejected when the reader reports them, and nesting deeper
/// than `MAX_DEPTH` is refused so the tree walks stay bounded.
pub fn parse_document(xml: &str) -> Result<XmlNode, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Synthetic holder for the document element
    let mut stack = vec![XmlNode::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                // The holder at the bottom of the stack is not an element
                if stack.len() > MAX_DEPTH {
                    return Err(XmlError::Malformed(format!(
                        "Element nesting exceeds {} levels",
                        MAX_DEPTH
                    )));
                }
                stack.push(node_from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let node = node_from_start(e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(XmlError::Malformed("Unbalanced end tag".into()));
                }
                if let Some(node) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
            }
            Ok(Event::Text(ref t)) => {
                let text = t
                    .unescape()
                    .map_err(|err| XmlError::Malformed(err.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Ok(Event::DocType(_)) => {
                return Err(XmlError::Forbidden("DOCTYPE declarations are not allowed".into()));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlError::Malformed(e.to_string())),
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(XmlError::Malformed("Unexpected end of document".into()));
    }
    stack
        .pop()
        .and_then(|holder| holder.children.into_iter().next())
        .ok_or_else(|| XmlError::Malformed("Empty document".into()))
}

fn fault_from_node(fault: &XmlNode) -> SoapFault {
    // SOAP 1.1: faultcode/faultstring. SOAP 1.2: Code/Value, Reason/Text.
    let code = fault
        .string_of("faultcode")
        .or_else(|| fault.child("Code").and_then(|c| c.string_of("Value")))
        .unwrap_or_else(|| "Unknown".to_string());
    let message = fault
        .string_of("faultstring")
        .or_else(|| fault.child("Reason").and_then(|r| r.string_of("Text")))
        .unwrap_or_default();
    let detail = fault
        .child("detail")
        .or_else(|| fault.child("Detail"))
        .map(|d| {
            if d.text.is_empty() {
                d.children
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            } else {
                d.text.clone()
            }
        })
        .filter(|s| !s.is_empty());

    SoapFault {
        code,
        message,
        detail,
    }
}

/// Parse a SOAP reply into its body payload or fault.
pub fn parse_reply(xml: &str) -> Result<SoapReply, XmlError> {
    let envelope = parse_document(xml)?;
    if envelope.name != "Envelope" {
        return Err(XmlError::NotSoap(format!(
            "Expected Envelope, found {}",
            envelope.name
        )));
    }

    let body = envelope
        .child("Body")
        .ok_or_else(|| XmlError::NotSoap("Envelope has no Body".into()))?;
    let payload = body
        .children
        .first()
        .ok_or_else(|| XmlError::NotSoap("Body is empty".into()))?;

    if payload.name == "Fault" {
        Ok(SoapReply::Fault(fault_from_node(payload)))
    } else {
        Ok(SoapReply::Body(payload.clone()))
    }
}
