//! Integration tests for handler routing: registry, chain and capability
//! defaults.

use jsonapi_server::error::JsonApiError;
use jsonapi_server::handler::{HandlerChain, HandlerRegistry, RequestHandler};
use jsonapi_server::http::HttpRequest;
use jsonapi_server::model::{Document, Resource};
use jsonapi_server::request::{FetchRequest, SaveRequest};

// ============================================================================
// Test handlers
// ============================================================================

/// A fetch-only handler answering for one resource type, labelling the
/// resources it builds so chain ordering is observable.
struct LabelledHandler {
    resource_type: &'static str,
    label: &'static str,
}

impl LabelledHandler {
    const fn new(resource_type: &'static str, label: &'static str) -> Self {
        Self {
            resource_type,
            label,
        }
    }

    fn check_type(&self, resource_type: &str) -> Result<(), JsonApiError> {
        if resource_type == self.resource_type {
            Ok(())
        } else {
            Err(JsonApiError::unsupported_type(resource_type))
        }
    }

    fn labelled(&self, id: &str) -> Resource {
        Resource::new(self.resource_type, id)
            .with_attribute("served_by", serde_json::json!(self.label))
    }
}

impl RequestHandler for LabelledHandler {
    fn fetch_resource(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.check_type(request.resource_type())?;
        Ok(Document::single(Some(self.labelled(request.id()))))
    }

    fn fetch_resources(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.check_type(request.resource_type())?;
        Ok(Document::collection(vec![self.labelled("1")]))
    }

    fn fetch_relationship(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.check_type(request.resource_type())?;
        Ok(Document::single(None))
    }
}

/// A handler that always fails with a provider error, for verifying that
/// chains stop on non-sentinel errors.
struct FailingHandler;

impl RequestHandler for FailingHandler {
    fn fetch_resource(&self, _request: &FetchRequest) -> Result<Document, JsonApiError> {
        Err(JsonApiError::provider("backend offline"))
    }

    fn fetch_resources(&self, _request: &FetchRequest) -> Result<Document, JsonApiError> {
        Err(JsonApiError::provider("backend offline"))
    }

    fn fetch_relationship(&self, _request: &FetchRequest) -> Result<Document, JsonApiError> {
        Err(JsonApiError::provider("backend offline"))
    }
}

fn fetch(uri: &str) -> FetchRequest {
    FetchRequest::from_http_request(&HttpRequest::get(uri), "").unwrap()
}

fn served_by(document: &Document) -> String {
    document.primary_resources()[0].attributes["served_by"]
        .as_str()
        .unwrap()
        .to_string()
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_routes_by_exact_type() {
    let mut registry = HandlerRegistry::new();
    registry
        .add_handler("tests", LabelledHandler::new("tests", "tests-handler"))
        .add_handler("examples", LabelledHandler::new("examples", "examples-handler"));

    let document = registry.fetch_resource(&fetch("/tests/test-1")).unwrap();
    assert_eq!(served_by(&document), "tests-handler");

    let document = registry.fetch_resource(&fetch("/examples/e-1")).unwrap();
    assert_eq!(served_by(&document), "examples-handler");
}

#[test]
fn test_registry_rejects_unmapped_types() {
    let mut registry = HandlerRegistry::new();
    registry.add_handler("tests", LabelledHandler::new("tests", "x"));

    let result = registry.fetch_resources(&fetch("/others"));
    assert!(matches!(
        result,
        Err(JsonApiError::UnsupportedType { resource_type }) if resource_type == "others"
    ));
}

#[test]
fn test_registry_write_operations_default_to_not_allowed() {
    let mut registry = HandlerRegistry::new();
    registry.add_handler("tests", LabelledHandler::new("tests", "x"));

    let save = SaveRequest::from_http_request(
        &HttpRequest::post("/tests", r#"{"data": {"type": "tests"}}"#),
        "",
    )
    .unwrap();

    assert!(matches!(
        registry.save_resource(&save),
        Err(JsonApiError::NotAllowed {
            operation: "save",
            ..
        })
    ));
}

// ============================================================================
// Chain
// ============================================================================

#[test]
fn test_chain_falls_through_to_the_supporting_handler() {
    let mut chain = HandlerChain::new();
    chain
        .add_handler(LabelledHandler::new("tests", "first"))
        .add_handler(LabelledHandler::new("examples", "second"));

    let document = chain.fetch_resource(&fetch("/examples/e-1")).unwrap();
    assert_eq!(served_by(&document), "second");
}

#[test]
fn test_chain_prefers_earlier_handlers() {
    let mut chain = HandlerChain::new();
    chain
        .add_handler(LabelledHandler::new("tests", "first"))
        .add_handler(LabelledHandler::new("tests", "second"));

    let document = chain.fetch_resource(&fetch("/tests/test-1")).unwrap();
    assert_eq!(served_by(&document), "first");
}

#[test]
fn test_chain_reraises_unsupported_type_when_all_decline() {
    let mut chain = HandlerChain::new();
    chain
        .add_handler(LabelledHandler::new("tests", "first"))
        .add_handler(LabelledHandler::new("examples", "second"));

    let result = chain.fetch_resource(&fetch("/others/o-1"));
    assert!(matches!(
        result,
        Err(JsonApiError::UnsupportedType { resource_type }) if resource_type == "others"
    ));
}

#[test]
fn test_empty_chain_declines_everything() {
    let chain = HandlerChain::new();
    assert!(matches!(
        chain.fetch_resources(&fetch("/tests")),
        Err(JsonApiError::UnsupportedType { .. })
    ));
}

#[test]
fn test_chain_stops_on_non_sentinel_errors() {
    // the failing handler answers for every type; the fallback must not run
    let mut chain = HandlerChain::new();
    chain
        .add_handler(FailingHandler)
        .add_handler(LabelledHandler::new("tests", "fallback"));

    let result = chain.fetch_resource(&fetch("/tests/test-1"));
    assert!(matches!(result, Err(JsonApiError::Provider { .. })));
}

#[test]
fn test_chain_of_registries_composes_without_a_central_table() {
    let mut module_a = HandlerRegistry::new();
    module_a.add_handler("tests", LabelledHandler::new("tests", "module-a"));

    let mut module_b = HandlerRegistry::new();
    module_b.add_handler("examples", LabelledHandler::new("examples", "module-b"));

    let mut chain = HandlerChain::new();
    chain.add_handler(module_a).add_handler(module_b);

    assert_eq!(
        served_by(&chain.fetch_resource(&fetch("/tests/t-1")).unwrap()),
        "module-a"
    );
    assert_eq!(
        served_by(&chain.fetch_resource(&fetch("/examples/e-1")).unwrap()),
        "module-b"
    );
}
