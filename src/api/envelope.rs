//! Purpose: Interpret the `{success, ...}` envelope returned by the canvas server.
//! Exports: `Envelope`, `interpret_response`, `parse_body`.
//! Invariants: `success` must be exactly boolean `true` on a 2xx status to count as success.
//! Invariants: Unparsable bodies never fail parsing; they surface as protocol errors.
use crate::core::error::{Error, ErrorKind};
use serde_json::Value;

/// A successful response body, kept whole so unknown fields survive.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope(Value);

impl Envelope {
    pub fn element(&self) -> Option<&Value> {
        self.0.get("element")
    }

    pub fn elements(&self) -> Option<&[Value]> {
        self.0
            .get("elements")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    pub fn count(&self) -> Option<u64> {
        self.0.get("count").and_then(Value::as_u64)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

pub fn parse_body(body: Option<&str>) -> Option<Value> {
    body.and_then(|text| serde_json::from_str(text).ok())
}

pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn interpret_response(
    status: u16,
    status_text: &str,
    body: Option<&str>,
) -> Result<Envelope, Error> {
    let parsed = parse_body(body);
    match parsed {
        Some(value)
            if is_success_status(status) && value.get("success") == Some(&Value::Bool(true)) =>
        {
            Ok(Envelope(value))
        }
        other => Err(protocol_error(status, status_text, other.as_ref())),
    }
}

pub(crate) fn protocol_error(status: u16, status_text: &str, body: Option<&Value>) -> Error {
    let mut message = format!("HTTP {status} {status_text}").trim_end().to_string();
    match body.and_then(|value| value.get("error")) {
        Some(Value::String(text)) => {
            message.push_str(": ");
            message.push_str(text);
        }
        Some(Value::Null) | None => {}
        Some(other) => {
            message.push_str(": ");
            message.push_str(&other.to_string());
        }
    }
    Error::new(ErrorKind::Protocol)
        .with_message(message)
        .with_status(status)
}
