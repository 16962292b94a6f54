//! Integration tests for harmony-bridge
//!
//! These tests drive the router end to end through its public entry point,
//! the same way a transport adapter would.

use harmony_bridge::body::BodyExt;
use harmony_bridge::config::Config;
use harmony_bridge::handlers::InfrastructureModule;
use harmony_bridge::router::{RawRequest, RawResponse};
use harmony_bridge::{Method, Response, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn router_with_infrastructure() -> Arc<Router> {
    let router = Arc::new(Router::new());
    router.register_module(Arc::new(InfrastructureModule::new(&Config::default())));
    router
}

fn post_batch(router: &Router, batch: Value) -> Value {
    let response = router.dispatch(
        RawRequest::new(Method::Post, "/api/v1/batch").with_body(batch.to_string()),
    );
    assert_eq!(response.status, 200);
    parse(&response)
}

fn parse(response: &RawResponse) -> Value {
    serde_json::from_str(&response.body).unwrap()
}

#[test]
fn test_single_step_batch() {
    let router = router_with_infrastructure();
    router.route(Method::Get, "/ping", |_| Response::ok(json!({"pong": true})));

    let outcome = post_batch(
        &router,
        json!({"requests": [{"method": "GET", "path": "/ping"}]}),
    );

    assert_eq!(outcome["results"][0]["data"], json!({"pong": true}));
    assert_eq!(outcome["results"][0]["status"], 200);
    assert_eq!(outcome["results"][0]["success"], true);
    assert_eq!(outcome["completed"], 1);
    assert_eq!(outcome["failed"], 0);
    assert_eq!(outcome["success"], true);
}

#[test]
fn test_reference_to_earlier_step() {
    let router = router_with_infrastructure();
    let seen = Arc::new(Mutex::new(Vec::new()));

    router.route(Method::Post, "/nodes", |_| Response::ok(json!({"id": "abc"})));
    let recorder = Arc::clone(&seen);
    router.route(Method::Post, "/links", move |request| {
        recorder.lock().unwrap().push(request.body.clone());
        Response::ok(json!({"linked": true}))
    });

    let outcome = post_batch(
        &router,
        json!({"requests": [
            {"method": "POST", "path": "/nodes", "body": {"kind": "source"}},
            {"method": "POST", "path": "/links", "body": {"ref": "$0.id", "missing": "$0.nope"}},
        ]}),
    );

    assert_eq!(outcome["completed"], 2);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[Some(json!({"ref": "abc", "missing": "$0.nope"}))]
    );
}

#[test]
fn test_batch_stops_at_first_failure() {
    let router = router_with_infrastructure();
    router.route(Method::Get, "/ok", |_| Response::ok(json!({})));

    let outcome = post_batch(
        &router,
        json!({"requests": [
            {"method": "GET", "path": "/ok"},
            {"method": "GET", "path": "/unknown"},
            {"method": "GET", "path": "/ok"},
        ]}),
    );

    let results = outcome["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["status"], 404);
    assert_eq!(results[1]["data"]["message"], "Route not found: GET /unknown");
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["failed"], 1);
}

#[test]
fn test_batch_continues_when_asked() {
    let router = router_with_infrastructure();
    router.route(Method::Get, "/ok", |_| Response::ok(json!({})));

    let outcome = post_batch(
        &router,
        json!({
            "requests": [
                {"method": "GET", "path": "/unknown"},
                "not a request",
                {"method": "GET", "path": "/ok"},
            ],
            "options": {"stop_on_error": false},
        }),
    );

    let results = outcome["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1], json!({"index": 1, "success": false, "error": "Invalid request object"}));
    assert_eq!(outcome["completed"], 1);
    assert_eq!(outcome["failed"], 2);
}

#[test]
fn test_nested_batch() {
    let router = router_with_infrastructure();
    router.route(Method::Get, "/ping", |_| Response::ok(json!({"pong": true})));

    let inner = json!({"requests": [{"method": "GET", "path": "/ping"}]});
    let outcome = post_batch(
        &router,
        json!({"requests": [{"method": "POST", "path": "/batch", "body": inner}]}),
    );

    assert_eq!(outcome["results"][0]["data"]["completed"], 1);
}

#[test]
fn test_handler_reads_body_fields() {
    let router = Arc::new(Router::new());
    router.route(Method::Post, "/actors", |request| {
        match request.body.get_str("name") {
            Ok(name) => Response::ok(json!({"created": name})),
            Err(e) => e.into(),
        }
    });

    let ok = router.dispatch(
        RawRequest::new(Method::Post, "/api/v1/actors").with_body(r#"{"name": "Cube"}"#),
    );
    assert_eq!(parse(&ok), json!({"created": "Cube"}));

    let missing = router.dispatch(
        RawRequest::new(Method::Post, "/api/v1/actors").with_body(r#"{"other": 1}"#),
    );
    assert_eq!(missing.status, 400);
    assert_eq!(parse(&missing)["message"], "Missing required field: name");
}

#[test]
fn test_custom_prefix_from_config() {
    let config = Config::parse(
        r#"
[server]
name = "editor-bridge"
api_prefix = "/bridge"
"#,
    )
    .unwrap();

    let router = Arc::new(Router::from_config(&config.server));
    router.register_module(Arc::new(InfrastructureModule::new(&config)));

    let response = router.dispatch(RawRequest::new(Method::Get, "/bridge/health"));
    assert_eq!(response.status, 200);
    assert_eq!(parse(&response)["server"]["name"], "editor-bridge");

    let response = router.dispatch(RawRequest::new(Method::Get, "/api/v1/health"));
    assert_eq!(response.status, 404);
}

#[test]
fn test_shutdown_clears_routes() {
    let router = router_with_infrastructure();
    assert!(!router.routes().is_empty());

    router.shutdown();

    assert!(router.routes().is_empty());
    assert!(router.modules().is_empty());
    let response = router.dispatch(RawRequest::new(Method::Get, "/health"));
    assert_eq!(response.status, 404);
}
