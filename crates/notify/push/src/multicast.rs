//! HTTP multicast push implementation using reqwest.

use std::time::Duration;

use color_eyre::eyre::WrapErr as _;
use notify_core::{BatchOutcome, NotificationPayload};

use crate::{DEFAULT_INVALID_TOKEN_CODES, MulticastRequest, MulticastResponse, Pusher};

/// Pusher that posts each batch to the provider's multicast endpoint.
#[derive(Clone)]
pub struct MulticastPusher {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    invalid_codes: Vec<String>,
}

impl MulticastPusher {
    /// Create a pusher for `endpoint` with a per-call timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> color_eyre::eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("failed to create push client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            invalid_codes: DEFAULT_INVALID_TOKEN_CODES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        })
    }

    /// Authenticate requests with a bearer credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Replace the set of error codes treated as permanently invalid.
    pub fn with_invalid_codes(mut self, codes: Vec<String>) -> Self {
        self.invalid_codes = codes;
        self
    }

    async fn send_multicast(
        &self,
        batch: &[String],
        payload: &NotificationPayload,
    ) -> color_eyre::eyre::Result<BatchOutcome> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&MulticastRequest::new(batch, payload));

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .wrap_err("multicast request failed")?
            .error_for_status()
            .wrap_err("provider rejected multicast request")?;

        let body: MulticastResponse = response
            .json()
            .await
            .wrap_err("failed to decode multicast response")?;

        let reported = (body.success_count, body.failure_count);
        let outcome = body
            .into_outcome(batch, &self.invalid_codes)
            .ok_or_else(|| {
                color_eyre::eyre::eyre!(
                    "multicast response not aligned with batch of {} tokens",
                    batch.len()
                )
            })?;

        if reported != (outcome.success_count, outcome.failure_count) {
            tracing::debug!(
                reported_success = reported.0,
                reported_failure = reported.1,
                success = outcome.success_count,
                failure = outcome.failure_count,
                "provider counts differ from per-token entries"
            );
        }

        Ok(outcome)
    }
}

impl Pusher for MulticastPusher {
    async fn send(&self, batch: &[String], payload: &NotificationPayload) -> BatchOutcome {
        match self.send_multicast(batch, payload).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    error = %format!("{e:#}"),
                    batch_size = batch.len(),
                    "multicast send failed, counting batch as failed"
                );
                BatchOutcome::failed(batch.len())
            }
        }
    }
}
