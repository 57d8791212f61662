//! Purpose: Library crate behind the `canvasctl` CLI and its tests.
//! Exports: `api` (canvas client), `config` (settings), `core` (errors, payload loading).
//! Role: Thin client for an external Excalidraw-compatible canvas server.
//! Invariants: Every operation is stateless and issues at most one HTTP request.
pub mod api;
pub mod config;
pub mod core;
