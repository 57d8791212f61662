//! Purpose: Public client surface for talking to a canvas server.
//! Exports: `CanvasClient`, `Envelope`, `ImportMode`, error types.
//! Role: Boundary used by the `canvasctl` binary and integration tests.
//! Invariants: Elements cross this boundary as opaque `serde_json::Value`s.

mod canvas;
mod envelope;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use canvas::{CanvasClient, ImportMode, endpoint};
pub use envelope::{Envelope, interpret_response};
