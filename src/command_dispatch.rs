//! Purpose: Hold top-level CLI command dispatch for `canvasctl`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and run one canvas operation per call.
//! Invariants: Payloads are loaded and validated before any network call.
//! Invariants: Each command issues at most one HTTP request.

use super::*;
use canvasctl::api::CanvasClient;
use canvasctl::core::payload::{self, PayloadSource};
use serde_json::{Value, json};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

pub(super) fn dispatch_command(
    command: Command,
    url: Option<String>,
    settings: &Settings,
) -> Result<RunOutcome, Error> {
    let client = CanvasClient::new(settings.server_url(url.as_deref()));
    match command {
        Command::Health => {
            let body = client.health()?;
            emit_line(&body)?;
        }
        Command::Clear => {
            let envelope = client.clear()?;
            emit_line(&report::clear_summary(envelope.count().unwrap_or(0)))?;
        }
        Command::Create { payload } => {
            let element = load_payload(payload, "canvasctl create")?;
            let envelope = client.create_element(&element)?;
            emit_json(report::echoed_element(&envelope))?;
        }
        Command::Get { id } => {
            let envelope = client.get_element(&id)?;
            emit_json(report::echoed_element(&envelope))?;
        }
        Command::Update { id, payload } => {
            let element = load_payload(payload, "canvasctl update --id <ID>")?;
            let envelope = client.update_element(&id, &element)?;
            emit_json(report::echoed_element(&envelope))?;
        }
        Command::Delete { id } => {
            client.delete_element(&id)?;
            emit_line(&report::delete_summary(&id))?;
        }
        Command::Import { input, mode } => {
            let elements = payload::load_element_list(&input)?;
            let mode = ImportMode::from(mode);
            debug!(count = elements.len(), mode = mode.as_str(), "importing elements");
            let envelope = client.import_elements(&elements, mode)?;
            let count = report::import_count(&envelope, elements.len());
            emit_line(&report::import_summary(count, mode))?;
        }
        Command::Export { out } => {
            let envelope = client.list_elements()?;
            let elements = envelope.elements().unwrap_or_default();
            match out {
                Some(path) => {
                    write_export_file(&path, elements)?;
                    emit_line(&report::export_summary(elements.len(), &path))?;
                }
                None => emit_json(&Value::Array(elements.to_vec()))?,
            }
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "canvasctl", &mut io::stdout());
        }
    }
    Ok(RunOutcome::ok())
}

fn load_payload(args: PayloadArgs, usage: &str) -> Result<Value, Error> {
    let source = PayloadSource::from_flags(args.data, args.file).ok_or_else(|| {
        Error::new(ErrorKind::Usage)
            .with_message("missing element data: provide --data or --file")
            .with_hint(format!(
                "Usage: {usage} (--data <JSON> | --file <PATH>) [--url <URL>]"
            ))
    })?;
    payload::load_json(&source)
}

fn write_export_file(path: &Path, elements: &[Value]) -> Result<(), Error> {
    let document = json!({ "elements": elements });
    let mut text = serde_json::to_string_pretty(&document).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode export json")
            .with_source(err)
    })?;
    text.push('\n');
    std::fs::write(path, text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write export file")
            .with_path(path)
            .with_source(err)
    })
}

fn emit_json(value: &Value) -> Result<(), Error> {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    emit_line(&text)
}

fn emit_line(text: &str) -> Result<(), Error> {
    write_line(&mut io::stdout().lock(), text)
}

fn write_line(out: &mut impl Write, text: &str) -> Result<(), Error> {
    writeln!(out, "{text}")
        .and_then(|()| out.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write to stdout")
                .with_source(err)
        })
}
