//! Property tests for routing and reference substitution

use harmony_bridge::batch::substitute_str;
use harmony_bridge::router::{normalize_path, RawRequest, RouteTable};
use harmony_bridge::{Handler, Method, Request, Response, Router};
use proptest::prelude::*;
use serde_json::{json, Value};

fn method() -> impl Strategy<Value = Method> {
    prop::sample::select(Method::ALL.to_vec())
}

fn path() -> impl Strategy<Value = String> {
    "(/[a-z0-9:_-]{1,8}){1,4}"
}

fn tagged(tag: u64) -> Handler {
    Handler::new(move |_| Response::ok(json!({ "tag": tag })))
}

proptest! {
    #[test]
    fn last_registration_wins(method in method(), path in path(), tags in prop::collection::vec(any::<u64>(), 1..6)) {
        let router = Router::new();
        for tag in &tags {
            router.register_route(method, &path, tagged(*tag));
        }

        let response = router.dispatch_internal(&Request::new(method, path.clone()));
        prop_assert_eq!(response.status, 200);
        prop_assert_eq!(response.body, Some(json!({ "tag": tags[tags.len() - 1] })));
        prop_assert_eq!(router.routes().len(), 1);
    }

    #[test]
    fn unregistered_routes_are_not_found(registered in path(), requested in path(), method in method()) {
        prop_assume!(registered != requested);
        prop_assume!(!requested.starts_with("/api"));

        let router = Router::new();
        router.register_route(method, &registered, tagged(0));

        let response = router.dispatch(RawRequest::new(method, &requested));
        prop_assert_eq!(response.status, 404);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        prop_assert_eq!(&body["error"], "NOT_FOUND");
    }

    #[test]
    fn methods_do_not_share_routes(path in path()) {
        let mut table = RouteTable::new();
        table.register(Method::Get, path.clone(), tagged(1));

        for other in [Method::Post, Method::Put, Method::Delete] {
            prop_assert!(table.lookup(other, &path).is_none());
        }
        prop_assert!(table.lookup(Method::Get, &path).is_some());
    }

    #[test]
    fn prefix_is_stripped_once(rest in path()) {
        prop_assume!(!rest.starts_with("/api"));
        prop_assert_eq!(normalize_path(&format!("/api/v1{}", rest), "/api/v1"), rest.clone());
        prop_assert_eq!(normalize_path(&rest, "/api/v1"), rest.clone());
        prop_assert_eq!(normalize_path(&rest[1..], "/api/v1"), rest);
    }

    #[test]
    fn text_without_references_is_unchanged(text in "[^$]{0,40}") {
        prop_assert_eq!(substitute_str(&text, &[json!({"id": "x"})]), text);
    }
}
