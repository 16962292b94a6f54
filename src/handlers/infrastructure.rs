//! Infrastructure endpoints for server health and API discovery
//!
//! Routes:
//!   GET  /health    - health check
//!   GET  /handlers  - registered modules
//!   GET  /schema    - self-documenting API description
//!   POST /batch     - run several requests in one call

use crate::batch::{self, BatchOptions, BatchRequest};
use crate::config::Config;
use crate::handlers::suggest::similar_names;
use crate::router::{
    EndpointSchema, Handler, HandlerModule, Method, ModuleInfo, Request, Response, Router,
    BAD_REQUEST, NOT_FOUND, SERVER_ERROR,
};
use crate::VERSION;
use serde_json::{json, Map, Value};
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, info};

/// Built-in module serving health, discovery and batch routes
pub struct InfrastructureModule {
    /// Name reported by `/health`
    server_name: String,
    /// `stop_on_error` used when a batch does not set it
    batch_defaults: BatchOptions,
    /// Largest accepted batch
    max_batch_requests: usize,
    /// Set once, when the module registers its routes
    router: OnceLock<Weak<Router>>,
}

impl InfrastructureModule {
    /// Create the module from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            server_name: config.server.name.clone(),
            batch_defaults: BatchOptions {
                stop_on_error: config.batch.stop_on_error,
            },
            max_batch_requests: config.batch.max_requests,
            router: OnceLock::new(),
        }
    }

    fn router(&self) -> Option<Arc<Router>> {
        self.router.get().and_then(Weak::upgrade)
    }

    /// GET /health
    fn handle_health(&self, _request: &Request) -> Response {
        let Some(router) = self.router() else {
            return router_unavailable();
        };

        let handlers: Vec<String> = router
            .modules()
            .into_iter()
            .map(|module| module.name)
            .collect();

        Response::ok(json!({
            "healthy": true,
            "status": "running",
            "server": {
                "name": self.server_name,
                "version": VERSION,
            },
            "handlers": handlers,
        }))
    }

    /// GET /handlers
    fn handle_handlers(&self, _request: &Request) -> Response {
        let Some(router) = self.router() else {
            return router_unavailable();
        };

        Response::ok(json!({
            "success": true,
            "handlers": router.modules(),
        }))
    }

    /// GET /schema[?handler=NAME|?endpoint=PATH]
    fn handle_schema(&self, request: &Request) -> Response {
        let Some(router) = self.router() else {
            return router_unavailable();
        };
        let modules = router.handler_modules();

        if let Some(name) = request.query_param("handler").filter(|v| !v.is_empty()) {
            return handler_schema(&modules, name);
        }

        if let Some(path) = request.query_param("endpoint").filter(|v| !v.is_empty()) {
            return endpoint_schema(&modules, path);
        }

        let handlers: Vec<Value> = modules
            .iter()
            .map(|module| describe(module.as_ref()))
            .collect();

        Response::ok(json!({
            "api_version": "v1",
            "base_path": router.api_prefix(),
            "error_codes": {
                BAD_REQUEST: "400 - Missing or malformed parameters",
                NOT_FOUND: "404 - Route or referenced entity does not exist",
                SERVER_ERROR: "500 - Internal error",
            },
            "handlers": handlers,
        }))
    }

    /// POST /batch
    fn handle_batch(&self, request: &Request) -> Response {
        let Some(router) = self.router() else {
            return router_unavailable();
        };

        let batch = match BatchRequest::parse(
            &request.body,
            self.batch_defaults,
            self.max_batch_requests,
        ) {
            Ok(batch) => batch,
            Err(e) => return Response::bad_request(e.to_string()),
        };

        debug!(
            "Running batch of {} request(s), stop_on_error={}",
            batch.requests.len(),
            batch.options.stop_on_error
        );

        let outcome = batch::run(&batch.requests, batch.options, &*router);
        Response::ok(outcome.to_value())
    }
}

impl HandlerModule for InfrastructureModule {
    fn base_path(&self) -> &str {
        ""
    }

    fn name(&self) -> &str {
        "Infrastructure"
    }

    fn description(&self) -> &str {
        "Server health and API discovery"
    }

    fn endpoint_schemas(&self) -> Vec<EndpointSchema> {
        vec![
            EndpointSchema::new(Method::Get, "/health", "Server health check"),
            EndpointSchema::new(Method::Get, "/handlers", "List registered handler modules"),
            EndpointSchema::new(Method::Get, "/schema", "Describe the API")
                .param("handler", "string", false, "Only this handler module (query)")
                .param("endpoint", "string", false, "Only this endpoint path (query)"),
            EndpointSchema::new(Method::Post, "/batch", "Run several requests in one call")
                .param(
                    "requests",
                    "array",
                    true,
                    "Objects {method, path, body}; strings in a body may reference an \
                     earlier response as $N.field.path",
                )
                .param("options", "object", false, "{stop_on_error: bool}"),
        ]
    }

    fn register_routes(self: Arc<Self>, router: &Arc<Router>) {
        if self.router.set(Arc::downgrade(router)).is_err() {
            debug!("Infrastructure module already bound to a router");
        }

        router.register_route(Method::Get, "/health", Handler::bind(&self, Self::handle_health));
        router.register_route(Method::Get, "/handlers", Handler::bind(&self, Self::handle_handlers));
        router.register_route(Method::Get, "/schema", Handler::bind(&self, Self::handle_schema));
        router.register_route(Method::Post, "/batch", Handler::bind(&self, Self::handle_batch));

        info!("Infrastructure module registered /health, /handlers, /schema and /batch");
    }
}

fn router_unavailable() -> Response {
    Response::server_error("Router not available")
}

/// `{name, base_path, description, endpoints}` for one module
fn describe(module: &dyn HandlerModule) -> Value {
    let info = ModuleInfo::of(module);
    json!({
        "name": info.name,
        "base_path": info.path,
        "description": info.description,
        "endpoints": module.endpoint_schemas(),
    })
}

fn handler_schema(modules: &[Arc<dyn HandlerModule>], name: &str) -> Response {
    if let Some(module) = modules
        .iter()
        .find(|module| module.name().eq_ignore_ascii_case(name))
    {
        let mut schema = describe(module.as_ref());
        if let Some(fields) = schema.as_object_mut() {
            fields.insert("success".to_string(), Value::Bool(true));
        }
        return Response::ok(schema);
    }

    let available: Vec<&str> = modules.iter().map(|module| module.name()).collect();
    let similar = similar_names(name, available.iter().copied(), 3, 5);

    let mut response = Response::not_found(format!("Handler '{}' not found", name));
    extend_body(
        &mut response,
        [
            ("available_handlers", json!(available)),
            ("similar", json!(similar)),
        ],
    );
    response
}

fn endpoint_schema(modules: &[Arc<dyn HandlerModule>], path: &str) -> Response {
    let wanted = path.trim_start_matches('/');

    for module in modules {
        for endpoint in module.endpoint_schemas() {
            if endpoint.path.trim_start_matches('/').eq_ignore_ascii_case(wanted) {
                let mut body = Map::new();
                body.insert("success".to_string(), Value::Bool(true));
                body.insert("handler".to_string(), json!(module.name()));
                if let Value::Object(fields) = json!(endpoint) {
                    body.extend(fields);
                }
                return Response::ok(Value::Object(body));
            }
        }
    }

    let available: Vec<String> = modules
        .iter()
        .flat_map(|module| module.endpoint_schemas())
        .map(|endpoint| endpoint.path)
        .collect();

    let mut response = Response::not_found(format!("Endpoint '{}' not found", path));
    extend_body(&mut response, [("available_endpoints", json!(available))]);
    response
}

fn extend_body<const N: usize>(response: &mut Response, extra: [(&str, Value); N]) {
    if let Some(Value::Object(fields)) = response.body.as_mut() {
        for (key, value) in extra {
            fields.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RawRequest;

    fn setup() -> Arc<Router> {
        let router = Arc::new(Router::new());
        router.register_module(Arc::new(InfrastructureModule::new(&Config::default())));
        router
    }

    fn get(router: &Router, target: &str) -> (u16, Value) {
        let response = router.dispatch(RawRequest::new(Method::Get, target));
        (response.status, serde_json::from_str(&response.body).unwrap())
    }

    #[test]
    fn test_health() {
        let router = setup();
        let (status, body) = get(&router, "/api/v1/health");
        assert_eq!(status, 200);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["server"]["name"], "harmony-bridge");
        assert_eq!(body["handlers"], json!(["Infrastructure"]));
    }

    #[test]
    fn test_handlers() {
        let router = setup();
        let (status, body) = get(&router, "/handlers");
        assert_eq!(status, 200);
        assert_eq!(
            body["handlers"],
            json!([{
                "name": "Infrastructure",
                "path": "",
                "description": "Server health and API discovery",
            }])
        );
    }

    #[test]
    fn test_full_schema() {
        let router = setup();
        let (status, body) = get(&router, "/schema");
        assert_eq!(status, 200);
        assert_eq!(body["base_path"], "/api/v1");
        assert_eq!(body["handlers"][0]["endpoints"].as_array().unwrap().len(), 4);
        assert!(body["error_codes"].get("NOT_FOUND").is_some());
    }

    #[test]
    fn test_schema_by_handler() {
        let router = setup();
        let (status, body) = get(&router, "/schema?handler=infrastructure");
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["name"], "Infrastructure");

        let (status, body) = get(&router, "/schema?handler=Infrastructur");
        assert_eq!(status, 404);
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Handler 'Infrastructur' not found");
        assert_eq!(body["similar"], json!(["Infrastructure"]));
        assert_eq!(body["available_handlers"], json!(["Infrastructure"]));
    }

    #[test]
    fn test_schema_by_endpoint() {
        let router = setup();
        let (status, body) = get(&router, "/schema?endpoint=batch");
        assert_eq!(status, 200);
        assert_eq!(body["handler"], "Infrastructure");
        assert_eq!(body["method"], "POST");
        assert_eq!(body["path"], "/batch");

        let (status, body) = get(&router, "/schema?endpoint=/nope");
        assert_eq!(status, 404);
        assert!(body["available_endpoints"]
            .as_array()
            .unwrap()
            .contains(&json!("/health")));
    }

    #[test]
    fn test_batch_missing_requests() {
        let router = setup();
        let response =
            router.dispatch(RawRequest::new(Method::Post, "/batch").with_body(r#"{"nope":1}"#));
        assert_eq!(response.status, 400);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["message"], "Missing required field: requests (array)");
    }

    #[test]
    fn test_batch_uses_configured_default() {
        let mut config = Config::default();
        config.batch.stop_on_error = false;
        let router = Arc::new(Router::new());
        router.register_module(Arc::new(InfrastructureModule::new(&config)));

        let body = json!({"requests": [
            {"method": "GET", "path": "/missing"},
            {"method": "GET", "path": "/health"},
        ]});
        let response = router.dispatch(
            RawRequest::new(Method::Post, "/batch").with_body(body.to_string()),
        );
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["completed"], 1);
    }

    #[test]
    fn test_module_outliving_router() {
        let module = Arc::new(InfrastructureModule::new(&Config::default()));
        let router = Arc::new(Router::new());
        router.register_module(module.clone());
        drop(router);

        let response = module.handle_health(&Request::new(Method::Get, "/health"));
        assert_eq!(response.status, 500);
        assert_eq!(response.body.unwrap()["message"], "Router not available");
    }
}
