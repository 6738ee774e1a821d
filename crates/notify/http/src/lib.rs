//! Notification HTTP Layer
//!
//! Axum handlers for job submission, status lookup and device registration.

mod api;
mod middleware;

pub use api::*;
pub use middleware::*;

use axum::Router;
use notify_push::Pusher;
use notify_service::DispatchService;
use notify_storage::AllStorage;

/// Create the notification API router.
pub fn api_router<S, P>(service: DispatchService<S, P>) -> Router
where
    S: AllStorage + Clone + 'static,
    P: Pusher + 'static,
{
    use axum::routing::{get, post};

    Router::new()
        .route("/v1/notifications", post(api::submit_notification::<S, P>))
        .route(
            "/v1/notifications/{job_id}",
            get(api::get_notification_status::<S, P>),
        )
        .route("/v1/devices", post(api::register_device::<S, P>))
        .route(
            "/v1/devices/{subscriber_id}/{platform}",
            get(api::get_device::<S, P>),
        )
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .with_state(service)
}
