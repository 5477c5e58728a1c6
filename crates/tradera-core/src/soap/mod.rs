//! SOAP 1.1 codec for the Tradera services.
//!
//! - `value`: typed request parameters
//! - `envelope`: request envelope and header blocks
//! - `response`: reply parsing and fault extraction
//! - `wsdl`: service descriptors built from the published WSDL

use thiserror::Error;

pub mod envelope;
pub mod response;
pub mod value;
pub mod wsdl;

pub use envelope::{HeaderBlock, SoapRequest};
pub use response::{parse_reply, SoapFault, SoapReply, XmlNode};
pub use value::{Param, Value};
pub use wsdl::{SchemaRegistry, ServiceDescriptor, ServiceKind};

/// Target namespace of every Tradera header and operation.
pub const TRADERA_NS: &str = "http://api.tradera.com";

pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Not a SOAP document: {0}")]
    NotSoap(String),

    #[error("Forbidden XML construct: {0}")]
    Forbidden(String),
}
