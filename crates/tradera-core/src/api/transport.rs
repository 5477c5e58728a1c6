//! HTTP transport seam.
//!
//! The client only needs two verbs: GET for WSDL discovery and a SOAP POST.
//! Keeping them behind a trait lets tests drive the client without a server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use thiserror::Error;

/// Status and body of a completed HTTP exchange. Non-2xx replies are still
/// replies; SOAP faults arrive with status 500.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a reply (connect, timeout, TLS, body read).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransportFailure(pub String);

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFailure(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            TransportFailure(format!("Connection failed: {}", err))
        } else {
            TransportFailure(err.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpReply, TransportFailure>;

    async fn post_soap(
        &self,
        url: &str,
        soap_action: &str,
        body: String,
    ) -> Result<HttpReply, TransportFailure>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tradera-kit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, TransportFailure> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }

    async fn post_soap(
        &self,
        url: &str,
        soap_action: &str,
        body: String,
    ) -> Result<HttpReply, TransportFailure> {
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_success_range() {
        assert!(HttpReply::ok("x").is_success());
        assert!(HttpReply { status: 204, body: String::new() }.is_success());
        assert!(!HttpReply { status: 500, body: String::new() }.is_success());
        assert!(!HttpReply { status: 302, body: String::new() }.is_success());
    }

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new(Duration::from_secs(5)).is_ok());
    }
}
