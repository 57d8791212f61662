//! Purpose: Resolve JSON request payloads from inline flags or files.
//! Exports: `PayloadSource`, `load_json`, `element_list`, `load_element_list`.
//! Role: The only input validation in the crate; elements stay opaque `Value`s.
//! Invariants: Inline data wins over a file when both are supplied.
//! Invariants: Element lists come from a bare array or an object's `elements` array.
use super::error::{Error, ErrorKind};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PayloadSource {
    Inline(String),
    File(PathBuf),
}

impl PayloadSource {
    /// Picks the payload source from `--data` / `--file`; `None` when neither is set.
    pub fn from_flags(data: Option<String>, file: Option<PathBuf>) -> Option<Self> {
        match (data, file) {
            (Some(data), _) => Some(Self::Inline(data)),
            (None, Some(file)) => Some(Self::File(file)),
            (None, None) => None,
        }
    }
}

pub fn load_json(source: &PayloadSource) -> Result<Value, Error> {
    match source {
        PayloadSource::Inline(data) => serde_json::from_str(data).map_err(|err| {
            Error::new(ErrorKind::Input)
                .with_message("invalid json in --data")
                .with_hint("Provide a single JSON value (e.g. '{\"type\":\"rectangle\"}').")
                .with_source(err)
        }),
        PayloadSource::File(path) => read_json_file(path),
    }
}

pub fn element_list(value: Value) -> Result<Vec<Value>, Error> {
    match value {
        Value::Array(elements) => Ok(elements),
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(elements)) => Ok(elements),
            _ => Err(shape_error()),
        },
        _ => Err(shape_error()),
    }
}

pub fn load_element_list(path: &Path) -> Result<Vec<Value>, Error> {
    let value = read_json_file(path)?;
    element_list(value).map_err(|err| err.with_path(path))
}

fn read_json_file(path: &Path) -> Result<Value, Error> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Input)
            .with_message("failed to read payload file")
            .with_path(path)
            .with_source(err)
    })?;
    serde_json::from_str(&text).map_err(|err| {
        Error::new(ErrorKind::Input)
            .with_message("invalid json in payload file")
            .with_path(path)
            .with_source(err)
    })
}

fn shape_error() -> Error {
    Error::new(ErrorKind::Input)
        .with_message("expected a JSON array of elements or an object with an \"elements\" array")
}
