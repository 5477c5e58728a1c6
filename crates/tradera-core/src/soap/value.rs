//! Typed request parameters for SOAP bodies.
//!
//! Parameters keep their insertion order since the vendor schemas are
//! `xsd:sequence` based and reject reordered elements.

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Rendered as `xsi:nil="true"`.
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    /// Rendered as `xsd:base64Binary`.
    Binary(Vec<u8>),
    /// A complex type with ordered child elements.
    Element(Vec<Param>),
    /// A repeated element, e.g. `ArrayOfInt` renders each entry as `<int>`.
    Array { item: String, values: Vec<Value> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Value {
    pub fn int_array(values: impl IntoIterator<Item = i64>) -> Self {
        Value::Array {
            item: "int".to_string(),
            values: values.into_iter().map(Value::Int).collect(),
        }
    }

    pub fn string_array(values: impl IntoIterator<Item = String>) -> Self {
        Value::Array {
            item: "string".to_string(),
            values: values.into_iter().map(Value::Text).collect(),
        }
    }

    /// Append this value as `<name>...</name>` to `out`.
    pub fn write_element(&self, name: &str, out: &mut String) {
        match self {
            Value::Null => {
                out.push_str(&format!("<{} xsi:nil=\"true\" />", name));
            }
            Value::Element(children) => {
                out.push_str(&format!("<{}>", name));
                write_params(children, out);
                out.push_str(&format!("</{}>", name));
            }
            Value::Array { item, values } => {
                out.push_str(&format!("<{}>", name));
                for value in values {
                    value.write_element(item, out);
                }
                out.push_str(&format!("</{}>", name));
            }
            scalar => {
                out.push_str(&format!("<{}>", name));
                out.push_str(&escape(scalar.scalar_text().as_str()));
                out.push_str(&format!("</{}>", name));
            }
        }
    }

    fn scalar_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Text(s) => s.clone(),
            Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            Value::Binary(bytes) => base64::engine::general_purpose::STANDARD.encode(bytes),
            Value::Null | Value::Element(_) | Value::Array { .. } => String::new(),
        }
    }
}

/// Append every parameter in order.
pub fn write_params(params: &[Param], out: &mut String) {
    for param in params {
        param.value.write_element(&param.name, out);
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
