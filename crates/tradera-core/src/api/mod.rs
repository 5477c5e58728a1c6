//! SOAP API client module for the Tradera services.
//!
//! This module provides the `TraderaClient` for calling the public and
//! restricted services, along with the pieces it owns: the per-application
//! call budget, the locally queued shop-item requests and the HTTP
//! transport seam.
//!
//! Public calls authenticate with the application id and service key.
//! Restricted calls additionally carry the user id and token obtained
//! through `fetch_token`.

pub mod client;
pub mod error;
pub mod pending;
pub mod rate_limit;
pub mod transport;

pub use client::TraderaClient;
pub use error::{ApiError, Result};
pub use pending::{PendingRequests, RequestOutcome, RequestResults, RequestStatus};
pub use rate_limit::{RateLimitInfo, RateLimiter};
pub use transport::{HttpReply, HttpTransport, Transport, TransportFailure};
