//! Multicast request/response wire format.

use std::collections::BTreeMap;

use notify_core::{BatchOutcome, NotificationPayload};
use serde::{Deserialize, Serialize};

/// Error codes that mean a token will never be deliverable again.
pub const DEFAULT_INVALID_TOKEN_CODES: &[&str] = &[
    "messaging/registration-token-not-registered",
    "messaging/invalid-registration-token",
    "UNREGISTERED",
];

/// Multicast request body.
#[derive(Debug, Serialize)]
pub struct MulticastRequest<'a> {
    pub tokens: &'a [String],
    pub notification: MulticastNotification<'a>,
    pub data: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct MulticastNotification<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> MulticastRequest<'a> {
    pub fn new(tokens: &'a [String], payload: &'a NotificationPayload) -> Self {
        Self {
            tokens,
            notification: MulticastNotification {
                title: &payload.title,
                body: &payload.body,
            },
            data: &payload.data,
        }
    }
}

/// Multicast response body. `responses` is index-aligned with the request tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastResponse {
    #[serde(default)]
    pub success_count: usize,
    #[serde(default)]
    pub failure_count: usize,
    #[serde(default)]
    pub responses: Vec<SendResponse>,
}

/// Per-token entry of a multicast response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub error: Option<SendError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendError {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl MulticastResponse {
    /// Convert the provider's per-token entries into a batch outcome.
    ///
    /// Returns `None` when the entries are not aligned with `batch`.
    pub fn into_outcome(self, batch: &[String], invalid_codes: &[String]) -> Option<BatchOutcome> {
        if self.responses.len() != batch.len() {
            return None;
        }

        let mut outcome = BatchOutcome::default();

        for (token, response) in batch.iter().zip(self.responses) {
            match response.error {
                None => outcome.success_count += 1,
                Some(error) => {
                    outcome.failure_count += 1;
                    if invalid_codes.iter().any(|code| *code == error.code) {
                        outcome.invalid_tokens.push(token.clone());
                    }
                }
            }
        }

        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_core::NotificationCategory;

    fn codes() -> Vec<String> {
        DEFAULT_INVALID_TOKEN_CODES.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_request_shape() {
        let payload = NotificationPayload::new("Hello", "World", NotificationCategory::Event);
        let tokens = vec!["a".to_string(), "b".to_string()];

        let json = serde_json::to_value(MulticastRequest::new(&tokens, &payload)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tokens": ["a", "b"],
                "notification": {"title": "Hello", "body": "World"},
                "data": {"type": "event"},
            })
        );
    }

    #[test]
    fn test_classify_entries() {
        let body = serde_json::json!({
            "successCount": 2,
            "failureCount": 2,
            "responses": [
                {},
                {"error": {"code": "messaging/registration-token-not-registered"}},
                {"error": {"code": "messaging/internal-error", "message": "retry later"}},
                {"error": null},
            ],
        });
        let response: MulticastResponse = serde_json::from_value(body).unwrap();
        let batch: Vec<String> = ["t0", "t1", "t2", "t3"].iter().map(|s| s.to_string()).collect();

        let outcome = response.into_outcome(&batch, &codes()).unwrap();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 2);
        assert_eq!(outcome.invalid_tokens, vec!["t1".to_string()]);
    }

    #[test]
    fn test_misaligned_response() {
        let response = MulticastResponse {
            success_count: 1,
            failure_count: 0,
            responses: vec![SendResponse::default()],
        };
        let batch = vec!["a".to_string(), "b".to_string()];
        assert!(response.into_outcome(&batch, &codes()).is_none());
    }
}
