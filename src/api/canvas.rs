//! Purpose: Blocking HTTP client for an Excalidraw-compatible canvas server.
//! Exports: `CanvasClient`, `ImportMode`, `endpoint`.
//! Role: One request per call; responses are checked through the `success` envelope.
//! Invariants: Endpoint = base URL minus at most one trailing slash + fixed path.
//! Invariants: Exactly one attempt per operation; no retries or timeouts beyond transport defaults.
//! Invariants: Request bodies are UTF-8 JSON sent with `Content-Type: application/json`.
#![allow(clippy::result_large_err)]

use super::envelope::{Envelope, interpret_response, is_success_status, parse_body, protocol_error};
use crate::core::error::{Error, ErrorKind};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;
use url::Url;

type ApiResult<T> = Result<T, Error>;

const HEALTH_PATH: &str = "/health";
const ELEMENTS_PATH: &str = "/api/elements";
const CLEAR_PATH: &str = "/api/elements/clear";
const BATCH_PATH: &str = "/api/elements/batch";
const SYNC_PATH: &str = "/api/elements/sync";

#[derive(Clone)]
pub struct CanvasClient {
    inner: Arc<CanvasClientInner>,
}

struct CanvasClientInner {
    base_url: String,
    agent: ureq::Agent,
}

/// How imported elements combine with what is already on the canvas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImportMode {
    /// Append to the existing elements.
    Batch,
    /// Replace the existing elements.
    Sync,
}

impl ImportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportMode::Batch => "batch",
            ImportMode::Sync => "sync",
        }
    }

    fn path(self) -> &'static str {
        match self {
            ImportMode::Batch => BATCH_PATH,
            ImportMode::Sync => SYNC_PATH,
        }
    }
}

#[derive(Serialize)]
struct ImportRequest<'a> {
    elements: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

struct RawResponse {
    status: u16,
    status_text: String,
    body: Option<String>,
}

impl CanvasClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().build();
        Self {
            inner: Arc::new(CanvasClientInner {
                base_url: base_url.into(),
                agent,
            }),
        }
    }

    /// Returns the raw health body; only the HTTP status is checked.
    pub fn health(&self) -> ApiResult<String> {
        let url = self.endpoint(HEALTH_PATH)?;
        let raw = self.send::<()>("GET", &url, None)?;
        if !is_success_status(raw.status) {
            let parsed = parse_body(raw.body.as_deref());
            return Err(
                protocol_error(raw.status, &raw.status_text, parsed.as_ref()).with_url(url.as_str())
            );
        }
        Ok(raw.body.unwrap_or_default())
    }

    pub fn list_elements(&self) -> ApiResult<Envelope> {
        let url = self.endpoint(ELEMENTS_PATH)?;
        self.request_envelope::<()>("GET", &url, None)
    }

    pub fn create_element(&self, element: &Value) -> ApiResult<Envelope> {
        let url = self.endpoint(ELEMENTS_PATH)?;
        self.request_envelope("POST", &url, Some(element))
    }

    pub fn get_element(&self, id: &str) -> ApiResult<Envelope> {
        let url = self.element_endpoint(id)?;
        self.request_envelope::<()>("GET", &url, None)
    }

    pub fn update_element(&self, id: &str, element: &Value) -> ApiResult<Envelope> {
        let url = self.element_endpoint(id)?;
        self.request_envelope("PUT", &url, Some(element))
    }

    pub fn delete_element(&self, id: &str) -> ApiResult<Envelope> {
        let url = self.element_endpoint(id)?;
        self.request_envelope::<()>("DELETE", &url, None)
    }

    pub fn clear(&self) -> ApiResult<Envelope> {
        let url = self.endpoint(CLEAR_PATH)?;
        self.request_envelope::<()>("DELETE", &url, None)
    }

    pub fn import_elements(&self, elements: &[Value], mode: ImportMode) -> ApiResult<Envelope> {
        let timestamp = match mode {
            ImportMode::Batch => None,
            ImportMode::Sync => Some(sync_timestamp(OffsetDateTime::now_utc())?),
        };
        let payload = ImportRequest {
            elements,
            timestamp,
        };
        let url = self.endpoint(mode.path())?;
        self.request_envelope("POST", &url, Some(&payload))
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        endpoint(&self.inner.base_url, path)
    }

    fn element_endpoint(&self, id: &str) -> ApiResult<Url> {
        let mut url = self.endpoint(ELEMENTS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::new(ErrorKind::Transport)
                    .with_message("canvas server url cannot be a base")
                    .with_url(self.inner.base_url.clone())
            })?
            .push(id);
        Ok(url)
    }

    fn request_envelope<T>(&self, method: &str, url: &Url, body: Option<&T>) -> ApiResult<Envelope>
    where
        T: Serialize + ?Sized,
    {
        let raw = self.send(method, url, body)?;
        interpret_response(raw.status, &raw.status_text, raw.body.as_deref())
            .map_err(|err| err.with_url(url.as_str()))
    }

    fn send<T>(&self, method: &str, url: &Url, body: Option<&T>) -> ApiResult<RawResponse>
    where
        T: Serialize + ?Sized,
    {
        debug!(method, url = %url, "sending canvas request");
        let request = self
            .inner
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let result = match body {
            Some(body) => {
                let payload = serde_json::to_string(body).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode request json")
                        .with_source(err)
                })?;
                request
                    .set("Content-Type", "application/json")
                    .send_string(&payload)
            }
            None => request.call(),
        };

        let response = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Transport)
                    .with_message("request failed")
                    .with_url(url.as_str())
                    .with_hint(format!(
                        "Is the canvas server running at {}? Set EXPRESS_SERVER_URL or pass --url.",
                        self.inner.base_url
                    ))
                    .with_source(err));
            }
        };

        let status = response.status();
        let status_text = response.status_text().to_string();
        // Read without ureq's `into_string` cap; exports can exceed 10 MB.
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|err| {
                Error::new(ErrorKind::Transport)
                    .with_message("failed to read response body")
                    .with_url(url.as_str())
                    .with_status(status)
                    .with_source(err)
            })?;
        let body = Some(body);
        debug!(status, bytes = body.as_ref().map_or(0, String::len), "received canvas response");
        Ok(RawResponse {
            status,
            status_text,
            body,
        })
    }
}

pub fn endpoint(base_url: &str, path: &str) -> ApiResult<Url> {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let raw = format!("{base}{path}");
    Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Transport)
            .with_message("invalid canvas server url")
            .with_url(raw.clone())
            .with_hint("Use an absolute http(s) URL such as http://localhost:3000.")
            .with_source(err)
    })
}

/// Millisecond-precision UTC timestamp, e.g. `2023-11-14T22:13:20.123Z`.
fn sync_timestamp(now: OffsetDateTime) -> ApiResult<String> {
    let format =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
    now.to_offset(time::UtcOffset::UTC)
        .format(format)
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("timestamp format failed")
                .with_source(err)
        })
}
