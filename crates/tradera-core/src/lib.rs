//! Client library for the Tradera marketplace SOAP API.
//!
//! - `api`: `TraderaClient`, rate limiting, queued requests, errors
//! - `auth`: sessions, the token login URL and redirect info
//! - `config`: environment-driven configuration
//! - `models`: typed request and reply data
//! - `soap`: envelope building, reply parsing and WSDL discovery

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod soap;

pub use api::{ApiError, RateLimitInfo, Result, TraderaClient};
pub use auth::{AuthInfo, LoginUrl, Session, SessionStore};
pub use config::Config;
