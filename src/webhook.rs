//! HTTP surface — gateway webhook plus health endpoints.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::EventError;
use crate::pipeline::{EventProcessor, InboundEvent};

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<EventProcessor>,
}

/// Build the webhook router.
pub fn webhook_routes(processor: Arc<EventProcessor>) -> Router {
    let state = AppState { processor };

    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/webhook", post(receive_webhook))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// ── Payload ─────────────────────────────────────────────────────────────

/// `NumMedia` arrives as a string in form posts and may be a number in JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MediaCount {
    Number(i64),
    Text(String),
}

impl MediaCount {
    /// Non-numeric or negative values count as no media.
    pub fn count(&self) -> u32 {
        match self {
            Self::Number(n) => (*n).clamp(0, i64::from(u32::MAX)) as u32,
            Self::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

/// The fields we read from a gateway webhook call.
///
/// Accepts `application/json`; anything else is decoded as a
/// url-encoded form, which is what the gateway sends by default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "NumMedia", default)]
    pub num_media: Option<MediaCount>,
}

impl WebhookPayload {
    pub fn into_event(self) -> InboundEvent {
        let attachments = self.num_media.as_ref().map(MediaCount::count).unwrap_or(0);
        InboundEvent::new(
            self.from.unwrap_or_default(),
            self.body.unwrap_or_default(),
            attachments,
        )
    }
}

impl<S> FromRequest<S> for WebhookPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(payload) = Json::<WebhookPayload>::from_request(req, state)
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()).into_response())?;
            Ok(payload)
        } else {
            let Form(payload) = Form::<WebhookPayload>::from_request(req, state)
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()).into_response())?;
            Ok(payload)
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn banner() -> &'static str {
    "Invite bridge is running!"
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let tracked = state.processor.registry().tracked().await;
    Json(serde_json::json!({
        "status": "ok",
        "service": "invite-bridge",
        "tracked_senders": tracked,
    }))
}

/// POST /webhook
///
/// Acknowledges with `200 OK` once the event is processed, whatever happened
/// to the outbound messages. Only a missing sender is refused.
async fn receive_webhook(State(state): State<AppState>, payload: WebhookPayload) -> Response {
    let event = payload.into_event();
    info!(
        event_id = %event.id,
        sender = %event.sender,
        attachments = event.attachment_count,
        "📩 Incoming message"
    );
    debug!(event_id = %event.id, text = %event.text, "Message body");

    match state.processor.process(event).await {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(e @ EventError::MissingSender) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_count_from_text() {
        assert_eq!(MediaCount::Text("2".into()).count(), 2);
        assert_eq!(MediaCount::Text(" 1 ".into()).count(), 1);
        assert_eq!(MediaCount::Text("".into()).count(), 0);
        assert_eq!(MediaCount::Text("abc".into()).count(), 0);
    }

    #[test]
    fn media_count_from_number() {
        assert_eq!(MediaCount::Number(3).count(), 3);
        assert_eq!(MediaCount::Number(-1).count(), 0);
    }

    #[test]
    fn json_payload_accepts_numeric_and_string_media() {
        let p: WebhookPayload =
            serde_json::from_str(r#"{"From":"whatsapp:+1","Body":"hi","NumMedia":1}"#).unwrap();
        assert_eq!(p.into_event().attachment_count, 1);

        let p: WebhookPayload =
            serde_json::from_str(r#"{"From":"whatsapp:+1","NumMedia":"2"}"#).unwrap();
        let event = p.into_event();
        assert_eq!(event.attachment_count, 2);
        assert_eq!(event.text, "");
    }

    #[test]
    fn missing_fields_become_empty_event() {
        let event = WebhookPayload::default().into_event();
        assert_eq!(event.sender, "");
        assert_eq!(event.text, "");
        assert_eq!(event.attachment_count, 0);
    }
}
