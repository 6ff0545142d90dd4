use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::history::HistoryBuffer;
use crate::logview;
use crate::platform::telegram;
use crate::relay::RelayDispatcher;

// ── Shared state ───────────────────────────────────────────────────────────────

/// Long-lived service context shared by all handlers.
pub struct AppState {
    pub history: HistoryBuffer,
    pub relay: RelayDispatcher,
}

impl AppState {
    pub fn new(history: HistoryBuffer, relay: RelayDispatcher) -> Self {
        Self { history, relay }
    }
}

#[derive(Serialize)]
struct Ack {
    ok: bool,
}

// ── Handlers ───────────────────────────────────────────────────────────────────

async fn home() -> &'static str {
    "tgrelay is running"
}

async fn telegram_health() -> &'static str {
    "Telegram webhook route is active"
}

/// Record the update, start relaying it, and acknowledge right away.
///
/// Telegram retries deliveries that are not answered promptly, so nothing
/// here waits on a relay destination.
async fn telegram_webhook(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Ack> {
    let payload = telegram::parse_body(&body);
    if payload.is_empty() && !body.is_empty() {
        debug!("Webhook body is not a JSON object ({} bytes), recording as empty", body.len());
    }

    let event = Arc::new(telegram::extract_event(payload));
    info!(
        "[TG] {} event {} chat_id={:?} chat_type={:?} text={:?}",
        event.timestamp_iso(),
        event.id,
        event.chat_id,
        event.chat_type,
        event.text
    );

    state.history.append(Arc::clone(&event)).await;

    state
        .relay
        .dispatch_all(event.id, Arc::clone(&event.raw_payload));

    Json(Ack { ok: true })
}

async fn logs(State(state): State<Arc<AppState>>) -> Html<String> {
    let records = state.history.snapshot().await;
    Html(logview::render_page(&records))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/telegram", get(telegram_health).post(telegram_webhook))
        .route("/logs", get(logs))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
