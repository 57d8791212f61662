//! Purpose: In-process mock canvas server for integration tests.
//! Exports: `MockCanvas`, `RecordedRequest`, `TestResult`.
//! Role: Serves canned responses per (method, path) and records every request it sees.
//! Invariants: Binds loopback on an ephemeral port; shuts down and joins on drop.
//! Invariants: Unregistered routes answer 404 with a `success: false` envelope.
#![allow(dead_code)]

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::oneshot;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body json")
    }
}

#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), Canned>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockCanvas {
    base_url: String,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MockCanvas {
    pub fn start() -> TestResult<Self> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.state
            .routes
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .insert(
                (method.to_string(), path.to_string()),
                Canned {
                    status,
                    body: body.into(),
                },
            );
    }

    pub fn respond_json(&self, method: &str, path: &str, body: Value) {
        self.respond(method, path, 200, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Drop for MockCanvas {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .requests
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            content_type,
            body,
        });

    let canned = state
        .routes
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .get(&(method.to_string(), path))
        .cloned();
    match canned {
        Some(canned) => (
            StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            [(header::CONTENT_TYPE, "application/json")],
            canned.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"success":false,"error":"no such route"}"#,
        )
            .into_response(),
    }
}
