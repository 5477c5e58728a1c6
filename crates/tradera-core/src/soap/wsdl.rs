//! WSDL service discovery.
//!
//! Each service descriptor is parsed once when the client is built. Operation
//! and type lookups afterwards are plain set membership checks.

use std::collections::BTreeSet;

use super::response::{parse_document, XmlNode};
use super::XmlError;

/// Which of the two vendor services an operation lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Application credentials only.
    Public,
    /// Requires an active user session.
    Restricted,
}

impl ServiceKind {
    /// File stem of the `.asmx` endpoint.
    pub fn endpoint_stem(&self) -> &'static str {
        match self {
            ServiceKind::Public => "publicservice",
            ServiceKind::Restricted => "restrictedservice",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::Public => "PublicService",
            ServiceKind::Restricted => "RestrictedService",
        }
    }

    pub fn endpoint_url(&self, base_url: &str) -> String {
        format!("{}/{}.asmx", base_url.trim_end_matches('/'), self.endpoint_stem())
    }

    pub fn wsdl_url(&self, base_url: &str) -> String {
        format!("{}?wsdl", self.endpoint_url(base_url))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    pub kind: ServiceKind,
    /// `<wsdl:service name=...>`, when present.
    pub name: Option<String>,
    /// SOAP endpoint the envelopes are posted to.
    pub endpoint: String,
    pub operations: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

impl ServiceDescriptor {
    /// Parse a WSDL document. `fallback_endpoint` is used when the document
    /// carries no `soap:address`.
    pub fn parse(kind: ServiceKind, wsdl: &str, fallback_endpoint: &str) -> Result<Self, XmlError> {
        let root = parse_document(wsdl)?;
        if root.name != "definitions" {
            return Err(XmlError::NotSoap(format!(
                "Expected WSDL definitions, found {}",
                root.name
            )));
        }

        let mut operations = BTreeSet::new();
        for port_type in root.children_named("portType") {
            for op in port_type.children_named("operation") {
                if let Some(name) = op.attribute("name") {
                    operations.insert(name.to_string());
                }
            }
        }
        if operations.is_empty() {
            return Err(XmlError::NotSoap("WSDL declares no operations".into()));
        }

        let mut types = BTreeSet::new();
        if let Some(types_node) = root.child("types") {
            for schema in types_node.children_named("schema") {
                collect_schema_names(schema, &mut types);
            }
        }

        let service = root.child("service");
        let name = service.and_then(|s| s.attribute("name")).map(String::from);
        let endpoint = service
            .and_then(|s| s.child("port"))
            .and_then(|p| p.child("address"))
            .and_then(|a| a.attribute("location"))
            .map(String::from)
            .unwrap_or_else(|| fallback_endpoint.to_string());

        Ok(Self {
            kind,
            name,
            endpoint,
            operations,
            types,
        })
    }

    pub fn has_operation(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }
}

fn collect_schema_names(schema: &XmlNode, out: &mut BTreeSet<String>) {
    for child in &schema.children {
        if matches!(child.name.as_str(), "complexType" | "simpleType" | "element") {
            if let Some(name) = child.attribute("name") {
                out.insert(name.to_string());
            }
        }
    }
}

/// Both service descriptors, resolved eagerly at client construction.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    public: ServiceDescriptor,
    restricted: ServiceDescriptor,
}

impl SchemaRegistry {
    pub fn new(public: ServiceDescriptor, restricted: ServiceDescriptor) -> Self {
        Self { public, restricted }
    }

    pub fn service(&self, kind: ServiceKind) -> &ServiceDescriptor {
        match kind {
            ServiceKind::Public => &self.public,
            ServiceKind::Restricted => &self.restricted,
        }
    }

    /// Ok when `operation` is declared by the service, otherwise a message
    /// naming the missing operation.
    pub fn require_operation(&self, kind: ServiceKind, operation: &str) -> Result<&ServiceDescriptor, String> {
        let service = self.service(kind);
        if service.has_operation(operation) {
            Ok(service)
        } else {
            Err(format!(
                "Operation {} is not offered by {}",
                operation,
                kind.display_name()
            ))
        }
    }

    pub fn require_type(&self, kind: ServiceKind, type_name: &str) -> Result<(), String> {
        if self.service(kind).has_type(type_name) {
            Ok(())
        } else {
            Err(format!(
                "Type {} is not declared by {}",
                type_name,
                kind.display_name()
            ))
        }
    }
}
