//! SOAP 1.1 request envelope assembly.

use super::value::{write_params, Param};
use super::{SOAP_11_NS, TRADERA_NS};

/// One `<soap:Header>` child in the Tradera namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBlock {
    pub name: &'static str,
    pub fields: Vec<Param>,
}

impl HeaderBlock {
    /// Application identity.
    pub fn authentication(app_id: i64, app_key: &str) -> Self {
        Self {
            name: "AuthenticationHeader",
            fields: vec![Param::new("AppId", app_id), Param::new("AppKey", app_key)],
        }
    }

    /// User/session identity for restricted calls.
    pub fn authorization(user_id: i64, token: &str) -> Self {
        Self {
            name: "AuthorizationHeader",
            fields: vec![Param::new("UserId", user_id), Param::new("Token", token)],
        }
    }

    /// Public service configuration: the application's public key.
    pub fn public_configuration(public_key: &str) -> Self {
        Self {
            name: "ConfigurationHeader",
            fields: vec![Param::new("PublicKey", public_key)],
        }
    }

    /// Restricted service configuration: 0 = production, 1 = sandbox,
    /// plus the maximum accepted age of cached results in seconds.
    pub fn restricted_configuration(sandbox: bool, max_result_age: u32) -> Self {
        Self {
            name: "ConfigurationHeader",
            fields: vec![
                Param::new("Sandbox", if sandbox { 1i64 } else { 0i64 }),
                Param::new("MaxResultAge", max_result_age),
            ],
        }
    }
}

/// A fully described outbound call.
#[derive(Debug, Clone)]
pub struct SoapRequest<'a> {
    pub operation: &'a str,
    pub headers: Vec<HeaderBlock>,
    pub params: &'a [Param],
}

impl SoapRequest<'_> {
    /// Value for the `SOAPAction` HTTP header.
    pub fn soap_action(&self) -> String {
        format!("\"{}/{}\"", TRADERA_NS, self.operation)
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        out.push_str(&format!(
            "<soap:Envelope xmlns:soap=\"{}\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\">",
            SOAP_11_NS
        ));

        if !self.headers.is_empty() {
            out.push_str("<soap:Header>");
            for header in &self.headers {
                out.push_str(&format!("<{} xmlns=\"{}\">", header.name, TRADERA_NS));
                write_params(&header.fields, &mut out);
                out.push_str(&format!("</{}>", header.name));
            }
            out.push_str("</soap:Header>");
        }

        out.push_str("<soap:Body>");
        out.push_str(&format!("<{} xmlns=\"{}\">", self.operation, TRADERA_NS));
        write_params(self.params, &mut out);
        out.push_str(&format!("</{}>", self.operation));
        out.push_str("</soap:Body></soap:Envelope>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::response::parse_reply;

    #[test]
    fn test_soap_action_is_quoted() {
        let request = SoapRequest {
            operation: "FetchToken",
            headers: vec![],
            params: &[],
        };
        assert_eq!(request.soap_action(), "\"http://api.tradera.com/FetchToken\"");
    }

    #[test]
    fn test_public_envelope_layout() {
        let params = [Param::new("userId", 5986811i64), Param::new("secretKey", "ABC")];
        let request = SoapRequest {
            operation: "FetchToken",
            headers: vec![
                HeaderBlock::authentication(1234, "service-key"),
                HeaderBlock::public_configuration("pub-key"),
            ],
            params: &params,
        };
        let xml = request.to_xml();

        assert!(xml.contains(
            "<AuthenticationHeader xmlns=\"http://api.tradera.com\">\
             <AppId>1234</AppId><AppKey>service-key</AppKey></AuthenticationHeader>"
        ));
        assert!(xml.contains("<PublicKey>pub-key</PublicKey>"));
        assert!(xml.contains(
            "<FetchToken xmlns=\"http://api.tradera.com\">\
             <userId>5986811</userId><secretKey>ABC</secretKey></FetchToken>"
        ));
        assert!(!xml.contains("AuthorizationHeader"));
    }

    #[test]
    fn test_restricted_headers() {
        let request = SoapRequest {
            operation: "EndItem",
            headers: vec![
                HeaderBlock::authentication(1, "k"),
                HeaderBlock::authorization(42, "tok"),
                HeaderBlock::restricted_configuration(false, 3600),
            ],
            params: &[],
        };
        let xml = request.to_xml();
        assert!(xml.contains("<UserId>42</UserId><Token>tok</Token>"));
        assert!(xml.contains("<Sandbox>0</Sandbox><MaxResultAge>3600</MaxResultAge>"));
    }

    #[test]
    fn test_envelope_is_well_formed() {
        let params = [Param::new("itemId", 7i64)];
        let request = SoapRequest {
            operation: "GetItem",
            headers: vec![HeaderBlock::authentication(1, "a&b")],
            params: &params,
        };
        let reply = parse_reply(&request.to_xml()).expect("envelope should parse");
        let body = reply.into_body().expect("no fault expected");
        assert_eq!(body.name, "GetItem");
        assert_eq!(body.text_of("itemId"), Some("7"));
    }
}
