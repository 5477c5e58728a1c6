//! Locally tracked shop-item submissions.
//!
//! `add_shop_item` queues a request and returns its id at once; polling the
//! id later flips it to completed once the processing delay has passed.
//! Entries are never removed.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::{ApiError, Result};
use crate::models::ShopItem;

/// Simulated processing time before a queued request completes.
pub const PROCESSING_DELAY_SECS: i64 = 5;

/// Id that callers use to probe error handling; always rejected.
pub const INVALID_REQUEST_ID: &str = "invalid_request_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Queued,
    Completed,
}

/// Synthesized result attached when a request completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub item_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub item: ShopItem,
    pub result: Option<RequestOutcome>,
}

/// What `get_request_results` hands back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestResults {
    pub request_id: String,
    pub status: RequestStatus,
    pub result: Option<RequestOutcome>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PendingRequests {
    requests: HashMap<String, PendingRequest>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Queue an item and return the new request id.
    pub fn submit(&mut self, item: ShopItem) -> String {
        self.submit_at(item, Utc::now())
    }

    pub fn submit_at(&mut self, item: ShopItem, now: DateTime<Utc>) -> String {
        let id = format!("req_{}", Uuid::new_v4().simple());
        self.requests.insert(
            id.clone(),
            PendingRequest {
                id: id.clone(),
                status: RequestStatus::Queued,
                created_at: now,
                item,
                result: None,
            },
        );
        id
    }

    pub fn get(&self, id: &str) -> Option<&PendingRequest> {
        self.requests.get(id)
    }

    /// Reject ids that can never name a request.
    pub fn validate_id(id: &str) -> Result<()> {
        if id.trim().is_empty() || id == INVALID_REQUEST_ID {
            return Err(ApiError::Validation(format!("Invalid request ID: {:?}", id)));
        }
        Ok(())
    }

    pub fn poll(&mut self, id: &str) -> Result<RequestResults> {
        self.poll_at(id, Utc::now())
    }

    pub fn poll_at(&mut self, id: &str, now: DateTime<Utc>) -> Result<RequestResults> {
        Self::validate_id(id)?;
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| ApiError::RequestNotFound(id.to_string()))?;

        if request.status == RequestStatus::Queued
            && now - request.created_at > Duration::seconds(PROCESSING_DELAY_SECS)
        {
            request.status = RequestStatus::Completed;
            request.result = Some(RequestOutcome {
                item_id: format!("item_{}", now.timestamp()),
                status: "success".to_string(),
                message: "Item successfully added to shop".to_string(),
            });
        }

        Ok(RequestResults {
            request_id: request.id.clone(),
            status: request.status,
            result: request.result.clone(),
            created_at: request.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ShopItem {
        ShopItem::new("Vintage lamp", "Brass, working", 250.0, 12)
    }

    #[test]
    fn test_submit_returns_unique_ids() {
        let mut pending = PendingRequests::new();
        let a = pending.submit(item());
        let b = pending.submit(item());
        assert_ne!(a, b);
        assert!(a.starts_with("req_"));
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn test_queued_until_delay_passes() {
        let mut pending = PendingRequests::new();
        let now = Utc::now();
        let id = pending.submit_at(item(), now);

        let early = pending.poll_at(&id, now + Duration::seconds(2)).unwrap();
        assert_eq!(early.status, RequestStatus::Queued);
        assert!(early.result.is_none());

        // Exactly at the delay is still queued
        let edge = pending.poll_at(&id, now + Duration::seconds(5)).unwrap();
        assert_eq!(edge.status, RequestStatus::Queued);

        let later = now + Duration::seconds(6);
        let done = pending.poll_at(&id, later).unwrap();
        assert_eq!(done.status, RequestStatus::Completed);
        let outcome = done.result.unwrap();
        assert_eq!(outcome.status, "success");
        assert_eq!(outcome.item_id, format!("item_{}", later.timestamp()));
        assert_eq!(done.created_at, now);
    }

    #[test]
    fn test_completed_result_is_stable() {
        let mut pending = PendingRequests::new();
        let now = Utc::now();
        let id = pending.submit_at(item(), now);

        let first = pending.poll_at(&id, now + Duration::seconds(10)).unwrap();
        let second = pending.poll_at(&id, now + Duration::seconds(60)).unwrap();
        assert_eq!(first.result, second.result);
    }

    #[test]
    fn test_invalid_and_unknown_ids() {
        let mut pending = PendingRequests::new();
        assert!(matches!(
            pending.poll(INVALID_REQUEST_ID),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(pending.poll(""), Err(ApiError::Validation(_))));
        assert!(matches!(
            pending.poll("req_missing"),
            Err(ApiError::RequestNotFound(id)) if id == "req_missing"
        ));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RequestStatus::Queued).unwrap(), "\"queued\"");
        assert_eq!(
            serde_json::to_string(&RequestStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
