//! Purpose: End-to-end tests for `CanvasClient` against a mock canvas server.
//! Role: Validate request shapes, envelope interpretation, and error kinds across TCP.
//! Invariants: Each client call results in exactly one recorded request.

mod common;

use canvasctl::api::{CanvasClient, ErrorKind, ImportMode};
use common::{MockCanvas, TestResult};
use serde_json::json;

#[test]
fn health_returns_raw_body() -> TestResult<()> {
    let server = MockCanvas::start()?;
    let body = r#"{"status":"healthy","elements_count":2}"#;
    server.respond("GET", "/health", 200, body);

    let client = CanvasClient::new(format!("{}/", server.base_url()));
    assert_eq!(client.health()?, body);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/health");
    Ok(())
}

#[test]
fn health_failure_reports_status() -> TestResult<()> {
    let server = MockCanvas::start()?;
    server.respond("GET", "/health", 503, "down");

    let err = CanvasClient::new(server.base_url()).health().expect_err("err");
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.message(), Some("HTTP 503 Service Unavailable"));
    Ok(())
}

#[test]
fn create_posts_element_as_json() -> TestResult<()> {
    let server = MockCanvas::start()?;
    let element = json!({"type": "rectangle", "x": 10, "y": 20, "width": 100, "height": 50});
    server.respond_json(
        "POST",
        "/api/elements",
        json!({"success": true, "element": {"id": "r1", "type": "rectangle"}}),
    );

    let envelope = CanvasClient::new(server.base_url()).create_element(&element)?;
    assert_eq!(envelope.element(), Some(&json!({"id": "r1", "type": "rectangle"})));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].json(), element);
    Ok(())
}

#[test]
fn clear_twice_tolerates_empty_canvas() -> TestResult<()> {
    let server = MockCanvas::start()?;
    let client = CanvasClient::new(server.base_url());

    server.respond_json("DELETE", "/api/elements/clear", json!({"success": true, "count": 3}));
    assert_eq!(client.clear()?.count(), Some(3));

    server.respond_json("DELETE", "/api/elements/clear", json!({"success": true, "count": 0}));
    assert_eq!(client.clear()?.count(), Some(0));

    assert_eq!(server.requests().len(), 2);
    Ok(())
}

#[test]
fn sync_import_attaches_timestamp() -> TestResult<()> {
    let server = MockCanvas::start()?;
    server.respond_json("POST", "/api/elements/sync", json!({"success": true, "count": 2}));
    let elements = vec![json!({"id": "a"}), json!({"id": "b"})];

    let envelope = CanvasClient::new(server.base_url()).import_elements(&elements, ImportMode::Sync)?;
    assert_eq!(envelope.count(), Some(2));

    let body = server.requests()[0].json();
    assert_eq!(body["elements"], json!(elements));
    let timestamp = body["timestamp"].as_str().expect("timestamp");
    assert_eq!(timestamp.len(), "2023-11-14T22:13:20.123Z".len());
    assert!(timestamp.ends_with('Z'));
    Ok(())
}

#[test]
fn batch_import_sends_only_elements() -> TestResult<()> {
    let server = MockCanvas::start()?;
    server.respond_json("POST", "/api/elements/batch", json!({"success": true}));
    let elements = vec![json!({"id": "a", "type": "arrow"})];

    CanvasClient::new(server.base_url()).import_elements(&elements, ImportMode::Batch)?;

    let request = &server.requests()[0];
    assert_eq!(request.path, "/api/elements/batch");
    assert_eq!(request.json(), json!({"elements": elements}));
    Ok(())
}

#[test]
fn element_operations_address_by_id() -> TestResult<()> {
    let server = MockCanvas::start()?;
    server.respond_json(
        "GET",
        "/api/elements/r1",
        json!({"success": true, "element": {"id": "r1"}}),
    );
    server.respond_json(
        "PUT",
        "/api/elements/r1",
        json!({"success": true, "element": {"id": "r1", "x": 5}}),
    );
    server.respond_json("DELETE", "/api/elements/r1", json!({"success": true}));
    let client = CanvasClient::new(server.base_url());

    assert_eq!(client.get_element("r1")?.element(), Some(&json!({"id": "r1"})));
    client.update_element("r1", &json!({"x": 5}))?;
    client.delete_element("r1")?;

    let methods: Vec<_> = server
        .requests()
        .into_iter()
        .map(|request| request.method)
        .collect();
    assert_eq!(methods, ["GET", "PUT", "DELETE"]);
    Ok(())
}

#[test]
fn success_false_carries_server_error() -> TestResult<()> {
    let server = MockCanvas::start()?;
    server.respond(
        "GET",
        "/api/elements/missing",
        404,
        r#"{"success":false,"error":"Element missing not found"}"#,
    );

    let err = CanvasClient::new(server.base_url())
        .get_element("missing")
        .expect_err("err");
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(
        err.message(),
        Some("HTTP 404 Not Found: Element missing not found")
    );
    assert!(err.url().unwrap_or_default().ends_with("/api/elements/missing"));
    Ok(())
}

#[test]
fn non_json_body_is_protocol_error() -> TestResult<()> {
    let server = MockCanvas::start()?;
    server.respond("GET", "/api/elements", 200, "<html>gateway</html>");

    let err = CanvasClient::new(server.base_url())
        .list_elements()
        .expect_err("err");
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.status(), Some(200));
    Ok(())
}

#[test]
fn unreachable_server_is_transport_error() -> TestResult<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let err = CanvasClient::new(format!("http://{addr}"))
        .clear()
        .expect_err("err");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.hint().is_some());
    Ok(())
}
