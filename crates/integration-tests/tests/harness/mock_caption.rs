//! Mock caption service for integration tests
//!
//! Serves `POST /api/generate` and `GET /health` the way the real backend
//! does, recording every multipart form it receives

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// How the mock answers `/api/generate`
#[derive(Debug, Clone)]
pub enum Reply {
    /// Captions derived from the received tone and topic (or image name)
    Echo,
    /// A fixed JSON body with status 200
    Json(serde_json::Value),
    /// An arbitrary status with a JSON body
    Status(u16, serde_json::Value),
    /// A non-JSON body with status 200
    Text(String),
}

/// Image part as it arrived on the wire
#[derive(Debug, Clone)]
pub struct ReceivedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// One multipart form as it arrived on the wire
#[derive(Debug, Clone, Default)]
pub struct ReceivedForm {
    /// Part names in arrival order
    pub field_names: Vec<String>,
    pub tone: Option<String>,
    pub topic: Option<String>,
    pub image: Option<ReceivedImage>,
}

/// Caption backend that records requests and answers predictably
pub struct MockCaptionService {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    generate_count: AtomicU32,
    health_count: AtomicU32,
    reply: Reply,
    forms: Mutex<Vec<ReceivedForm>>,
}

impl MockCaptionService {
    /// Start a mock that echoes the request back as captions
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with_reply(Reply::Echo).await
    }

    /// Start a mock that answers every generation with `reply`
    pub async fn start_with_reply(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            generate_count: AtomicU32::new(0),
            health_count: AtomicU32::new(0),
            reply,
            forms: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/generate", routing::post(handle_generate))
            .route("/health", routing::get(handle_health))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to point a caption client at
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of generation requests received
    pub fn generate_count(&self) -> u32 {
        self.state.generate_count.load(Ordering::Relaxed)
    }

    /// Number of health checks received
    pub fn health_count(&self) -> u32 {
        self.state.health_count.load(Ordering::Relaxed)
    }

    /// Forms received so far, oldest first
    pub fn forms(&self) -> Vec<ReceivedForm> {
        self.state.forms.lock().map(|forms| forms.clone()).unwrap_or_default()
    }

    /// The most recent form, panicking if none arrived
    pub fn last_form(&self) -> ReceivedForm {
        self.forms().pop().expect("no generation request received")
    }
}

impl Drop for MockCaptionService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Handlers --

async fn handle_generate(
    State(state): State<Arc<MockState>>,
    mut multipart: Multipart,
) -> Response {
    state.generate_count.fetch_add(1, Ordering::Relaxed);

    let mut form = ReceivedForm::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        form.field_names.push(name.clone());

        match name.as_str() {
            "tone" => form.tone = field.text().await.ok(),
            "topic" => form.topic = field.text().await.ok(),
            "image" => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.unwrap_or_default();
                form.image = Some(ReceivedImage {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let response = match &state.reply {
        Reply::Echo => (StatusCode::OK, Json(echo_captions(&form))).into_response(),
        Reply::Json(body) => (StatusCode::OK, Json(body.clone())).into_response(),
        Reply::Status(status, body) => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(body.clone())).into_response()
        }
        Reply::Text(body) => (StatusCode::OK, body.clone()).into_response(),
    };

    if let Ok(mut forms) = state.forms.lock() {
        forms.push(form);
    }

    response
}

async fn handle_health(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.health_count.fetch_add(1, Ordering::Relaxed);

    Json(json!({ "status": "ok", "model": "mock-caption-model" }))
}

/// Captions naming the received tone and subject, so tests can check both
/// made it across
fn echo_captions(form: &ReceivedForm) -> serde_json::Value {
    let tone = form.tone.as_deref().unwrap_or("none");
    let subject = form
        .topic
        .as_deref()
        .or_else(|| form.image.as_ref().and_then(|image| image.file_name.as_deref()))
        .unwrap_or("nothing");

    json!({
        "twitter": format!("[{tone}] tweet about {subject}"),
        "linkedin": format!("[{tone}] post about {subject}"),
        "instagram": format!("[{tone}] caption for {subject}"),
        "youtube": format!("[{tone}] video about {subject}"),
    })
}
