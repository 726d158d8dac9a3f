use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::notify::EnquiryNotifier;
use super::repository::EnquiryRepository;
use super::service::{EnquiryIntakeService, IntakeError};
use super::validation::ValidationError;

const RECENT_LIMIT: usize = 50;

/// Router exposing the intake endpoint and the admin listing.
pub fn intake_router<R, N>(service: Arc<EnquiryIntakeService<R, N>>) -> Router
where
    R: EnquiryRepository + 'static,
    N: EnquiryNotifier + 'static,
{
    Router::new()
        .route(
            "/api/contact",
            post(submit_handler::<R, N>).get(list_handler::<R, N>),
        )
        .with_state(service)
}

/// Resolve the submitting address from proxy headers. `x-forwarded-for` may
/// carry a hop chain; only the first entry is the client.
fn client_address(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    forwarded
        .or(real_ip)
        .unwrap_or("unknown")
        .to_string()
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<EnquiryIntakeService<R, N>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: EnquiryRepository + 'static,
    N: EnquiryNotifier + 'static,
{
    let address = client_address(&headers);

    match service.submit(&body, &address) {
        Ok(enquiry) => {
            let payload = json!({
                "success": true,
                "message": "Your message has been sent successfully! We will get back to you soon.",
                "id": enquiry.id,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<EnquiryIntakeService<R, N>>>,
) -> Response
where
    R: EnquiryRepository + 'static,
    N: EnquiryNotifier + 'static,
{
    match service.recent(RECENT_LIMIT) {
        Ok(submissions) => {
            let payload = json!({ "submissions": submissions });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
                "code": "storage_unavailable",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

fn error_response(err: IntakeError) -> Response {
    match err {
        IntakeError::RateLimited => {
            let payload = json!({
                "error": "Too many submissions. Please try again later.",
                "code": "rate_limited",
            });
            (StatusCode::TOO_MANY_REQUESTS, axum::Json(payload)).into_response()
        }
        IntakeError::MalformedRequest => {
            let payload = json!({
                "error": "Request body must be a JSON object.",
                "code": "malformed_request",
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        IntakeError::Validation(validation) => {
            let status = match validation {
                ValidationError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            let payload = json!({
                "error": validation.to_string(),
                "code": validation.code(),
                "field": validation.field(),
            });
            (status, axum::Json(payload)).into_response()
        }
        IntakeError::Storage(storage) => {
            let payload = json!({
                "error": storage.to_string(),
                "code": "storage_unavailable",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_address(&headers), "203.0.113.9");
    }

    #[test]
    fn real_ip_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_address(&headers), "198.51.100.4");
    }

    #[test]
    fn unknown_when_no_proxy_headers_present() {
        assert_eq!(client_address(&HeaderMap::new()), "unknown");
    }
}
