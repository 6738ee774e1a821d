//! REST API handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use notify_core::{DeviceToken, NotificationCategory, NotificationPayload, Platform};
use notify_push::Pusher;
use notify_service::{DispatchError, DispatchService};
use notify_storage::{AllStorage, DeviceRegistry as _, StatusStore as _};

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error carrying the status to respond with.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(error: color_eyre::eyre::Report) -> Self {
        tracing::error!(error = %format!("{error:#}"), "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::NoRecipients => Self::new(StatusCode::BAD_REQUEST, error.to_string()),
            DispatchError::Submit(e) | DispatchError::Finalize(e) => Self::internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Notification submission request.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category: NotificationCategory,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    /// Restrict delivery to these subscribers; everyone when empty.
    #[serde(default)]
    pub subscriber_ids: Vec<String>,
    /// Explicit recipient tokens; bypasses registry lookup.
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
}

/// Notification submission response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub recipients: usize,
    pub batches: usize,
}

/// Queue a notification for every resolved recipient.
pub async fn submit_notification<S, P>(
    State(service): State<DispatchService<S, P>>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError>
where
    S: AllStorage + Clone + 'static,
    P: Pusher + 'static,
{
    let tokens = match request.tokens {
        Some(tokens) => tokens,
        None => service
            .resolve_recipients(&request.subscriber_ids)
            .map_err(ApiError::internal)?,
    };

    let payload = NotificationPayload::new(request.title, request.body, request.category)
        .with_data(request.data);
    let job = service.new_job(payload, tokens);

    let submitted = service.accept(job)?;

    tracing::info!(
        job_id = %submitted.job_id,
        recipients = submitted.recipients,
        "notification accepted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id: submitted.job_id,
            recipients: submitted.recipients,
            batches: submitted.batches,
        }),
    ))
}

/// Get the persisted status of a notification job.
pub async fn get_notification_status<S, P>(
    State(service): State<DispatchService<S, P>>,
    Path(job_id): Path<String>,
) -> Result<Json<notify_core::NotificationStatus>, ApiError>
where
    S: AllStorage + Clone + 'static,
    P: Pusher + 'static,
{
    match service.store().get_status(&job_id) {
        Ok(Some(status)) => Ok(Json(status)),
        Ok(None) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("notification {} not found", job_id),
        )),
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// Device registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub subscriber_id: String,
    pub platform: Platform,
    pub token: String,
}

/// Register (or replace) a subscriber's device token.
pub async fn register_device<S, P>(
    State(service): State<DispatchService<S, P>>,
    Json(request): Json<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceToken>), ApiError>
where
    S: AllStorage + Clone + 'static,
    P: Pusher + 'static,
{
    if request.subscriber_id.trim().is_empty() || request.token.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "subscriber_id and token are required",
        ));
    }

    let device = DeviceToken {
        subscriber_id: request.subscriber_id,
        platform: request.platform,
        token: request.token,
    };

    service
        .store()
        .register(&device)
        .map_err(ApiError::internal)?;

    Ok((StatusCode::CREATED, Json(device)))
}

/// Look up the device registered for a subscriber on one platform.
pub async fn get_device<S, P>(
    State(service): State<DispatchService<S, P>>,
    Path((subscriber_id, platform)): Path<(String, Platform)>,
) -> Result<Json<DeviceToken>, ApiError>
where
    S: AllStorage + Clone + 'static,
    P: Pusher + 'static,
{
    match service.store().get_device(&subscriber_id, platform) {
        Ok(Some(device)) => Ok(Json(device)),
        Ok(None) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("no {} device for subscriber {}", platform, subscriber_id),
        )),
        Err(e) => Err(ApiError::internal(e)),
    }
}
