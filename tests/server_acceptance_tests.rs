//! End-to-end acceptance tests: HTTP request in, document out, against an
//! in-memory provider.

use jsonapi_server::config::ServerConfig;
use jsonapi_server::error::JsonApiError;
use jsonapi_server::handler::{ProviderRequestHandler, ResourceProvider};
use jsonapi_server::http::{HttpMethod, HttpRequest};
use jsonapi_server::model::{Relationship, Resource};
use jsonapi_server::request::{FetchRequest, RelationshipModificationRequest, SaveRequest};
use jsonapi_server::server::JsonApiServer;
use jsonapi_server::MEDIA_TYPE;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// In-memory provider
// ============================================================================

/// Serves the `tests` type with a to-one `owner` and a to-many `examples`
/// relationship, and deterministic write behavior.
struct AcceptanceProvider;

impl AcceptanceProvider {
    fn build_test(id: &str) -> Resource {
        Resource::new("tests", id)
            .with_attribute("name", json!("Test"))
            .with_attribute("secret", json!("hidden"))
            .with_relationship(Relationship::to_one(
                "owner",
                Some(Resource::new("people", "p-1").with_attribute("handle", json!("owner-1"))),
            ))
            .with_relationship(Relationship::to_many(
                "examples",
                vec![Resource::new("examples", "example-1")
                    .with_attribute("title", json!("Example"))],
            ))
    }
}

impl ResourceProvider for AcceptanceProvider {
    fn find_resource(
        &self,
        resource_type: &str,
        id: &str,
        _request: &FetchRequest,
    ) -> Result<Resource, JsonApiError> {
        match id {
            "test-1" | "test-2" => Ok(Self::build_test(id)),
            "boom" => Err(JsonApiError::provider("database exploded")),
            _ => Err(JsonApiError::not_found(resource_type, id)),
        }
    }

    fn find_resources(
        &self,
        _resource_type: &str,
        _request: &FetchRequest,
    ) -> Result<Vec<Resource>, JsonApiError> {
        Ok(vec![Self::build_test("test-1"), Self::build_test("test-2")])
    }

    fn create_resource(&self, request: &SaveRequest) -> Result<Resource, JsonApiError> {
        let mut resource = Resource::new("tests", "created-1");
        resource.attributes = request.resource().attributes.clone();
        Ok(resource)
    }

    fn patch_resource(&self, request: &SaveRequest) -> Result<Resource, JsonApiError> {
        if request.id() != "test-1" {
            return Err(JsonApiError::not_found(request.resource_type(), request.id()));
        }
        let mut resource = Resource::new("tests", request.id());
        resource.attributes = request.resource().attributes.clone();
        Ok(resource)
    }

    fn delete_resource(&self, resource_type: &str, id: &str) -> Result<(), JsonApiError> {
        if id == "test-1" {
            Ok(())
        } else {
            Err(JsonApiError::not_found(resource_type, id))
        }
    }

    fn modify_relationship(
        &self,
        request: &RelationshipModificationRequest,
    ) -> Result<Relationship, JsonApiError> {
        // echo the requested linkage as the relationship's new state
        Ok(request.related().clone())
    }
}

fn server() -> JsonApiServer {
    let mut handler = ProviderRequestHandler::new();
    handler.add_provider("tests", AcceptanceProvider);
    JsonApiServer::new(handler, ServerConfig::default())
}

fn debug_server() -> JsonApiServer {
    let mut handler = ProviderRequestHandler::new();
    handler.add_provider("tests", AcceptanceProvider);
    JsonApiServer::new(
        handler,
        ServerConfig::builder().debug(true).build().unwrap(),
    )
}

// ============================================================================
// Fetching
// ============================================================================

#[test]
fn test_fetch_single_resource_with_include() {
    init_tracing();
    let document = server().handle_http_request(&HttpRequest::get("/tests/test-1?include=examples"));

    assert_eq!(document.http_status(), 200);
    let rendered = document.to_json();

    assert_eq!(rendered["data"]["type"], json!("tests"));
    assert_eq!(rendered["data"]["id"], json!("test-1"));
    assert_eq!(rendered["data"]["attributes"]["name"], json!("Test"));
    assert_eq!(
        rendered["data"]["relationships"]["examples"]["data"][0],
        json!({"type": "examples", "id": "example-1"})
    );
    assert_eq!(rendered["included"][0]["id"], json!("example-1"));
    assert_eq!(
        rendered["included"][0]["attributes"]["title"],
        json!("Example")
    );
}

#[test]
fn test_fetch_without_include_has_no_included_member() {
    let document = server().handle_http_request(&HttpRequest::get("/tests/test-1"));

    let rendered = document.to_json();
    assert!(rendered.get("included").is_none());
    // relationship linkage stays visible
    assert_eq!(
        rendered["data"]["relationships"]["owner"]["data"]["id"],
        json!("p-1")
    );
}

#[test]
fn test_fetch_collection() {
    let document = server().handle_http_request(&HttpRequest::get("/tests"));

    assert_eq!(document.http_status(), 200);
    let rendered = document.to_json();
    assert_eq!(rendered["data"].as_array().unwrap().len(), 2);
    assert_eq!(rendered["data"][0]["id"], json!("test-1"));
}

#[test]
fn test_fetch_with_sparse_fieldsets() {
    let document = server()
        .handle_http_request(&HttpRequest::get("/tests/test-1?fields[tests]=name"));

    let rendered = document.to_json();
    assert_eq!(rendered["data"]["attributes"], json!({"name": "Test"}));
}

#[test]
fn test_fetch_to_one_relationship_linkage() {
    let document = server()
        .handle_http_request(&HttpRequest::get("/tests/test-1/relationship/owner"));

    assert_eq!(document.http_status(), 200);
    let rendered = document.to_json();
    assert_eq!(rendered["data"], json!({"type": "people", "id": "p-1"}));
}

#[test]
fn test_fetch_to_many_relationship_linkage() {
    let document = server()
        .handle_http_request(&HttpRequest::get("/tests/test-1/relationship/examples"));

    let rendered = document.to_json();
    assert_eq!(
        rendered["data"],
        json!([{"type": "examples", "id": "example-1"}])
    );
}

#[test]
fn test_fetch_related_resources_keep_full_bodies() {
    let document = server().handle_http_request(&HttpRequest::get("/tests/test-1/owner"));

    let rendered = document.to_json();
    assert_eq!(rendered["data"]["id"], json!("p-1"));
    assert_eq!(rendered["data"]["attributes"]["handle"], json!("owner-1"));
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_create_resource_responds_201() {
    init_tracing();
    let body = r#"{"data": {"type": "tests", "attributes": {"name": "New"}}}"#;
    let document = server().handle_http_request(&HttpRequest::post("/tests", body));

    assert_eq!(document.http_status(), 201);
    let rendered = document.to_json();
    assert_eq!(rendered["data"]["id"], json!("created-1"));
    assert_eq!(rendered["data"]["attributes"]["name"], json!("New"));
}

#[test]
fn test_patch_resource_responds_200() {
    let body = r#"{"data": {"type": "tests", "id": "test-1", "attributes": {"name": "Renamed"}}}"#;
    let document = server().handle_http_request(&HttpRequest::patch("/tests/test-1", body));

    assert_eq!(document.http_status(), 200);
    assert_eq!(
        document.to_json()["data"]["attributes"]["name"],
        json!("Renamed")
    );
}

#[test]
fn test_post_with_id_requires_patch() {
    let body = r#"{"data": {"type": "tests", "id": "test-1"}}"#;
    let document = server().handle_http_request(&HttpRequest::post("/tests/test-1", body));

    assert_eq!(document.http_status(), 400);
    let rendered = document.to_json();
    assert!(rendered["errors"][0]["detail"]
        .as_str()
        .unwrap()
        .contains("PATCH"));
}

#[test]
fn test_patch_without_id_requires_post() {
    let body = r#"{"data": {"type": "tests"}}"#;
    let document = server().handle_http_request(&HttpRequest::patch("/tests", body));

    assert_eq!(document.http_status(), 400);
}

#[test]
fn test_delete_resource_responds_204() {
    let document = server().handle_http_request(&HttpRequest::delete("/tests/test-1"));
    assert_eq!(document.http_status(), 204);
}

#[test]
fn test_delete_requires_an_id() {
    let document = server().handle_http_request(&HttpRequest::delete("/tests"));
    assert_eq!(document.http_status(), 400);
}

#[test]
fn test_delete_unknown_id_responds_404() {
    let document = server().handle_http_request(&HttpRequest::delete("/tests/unknown"));
    assert_eq!(document.http_status(), 404);
}

// ============================================================================
// Relationship modification
// ============================================================================

#[test]
fn test_relationship_add_replace_and_remove() {
    let body = r#"{"data": [{"type": "examples", "id": "example-9"}]}"#;
    let path = "/tests/test-1/relationship/examples";

    for request in [
        HttpRequest::post(path, body),
        HttpRequest::patch(path, body),
        HttpRequest::builder(HttpMethod::Delete, path)
            .header("Content-Type", MEDIA_TYPE)
            .body(body)
            .build(),
    ] {
        let document = server().handle_http_request(&request);
        assert_eq!(document.http_status(), 200, "{}", request.method);
        assert_eq!(
            document.to_json()["data"],
            json!([{"type": "examples", "id": "example-9"}])
        );
    }
}

#[test]
fn test_relationship_replace_with_empty_linkage() {
    let document = server().handle_http_request(&HttpRequest::patch(
        "/tests/test-1/relationship/examples",
        r#"{"data": []}"#,
    ));

    assert_eq!(document.http_status(), 200);
    assert_eq!(document.to_json()["data"], json!([]));
}

#[test]
fn test_related_resources_can_not_be_modified() {
    let document = server().handle_http_request(&HttpRequest::patch(
        "/tests/test-1/examples",
        r#"{"data": []}"#,
    ));

    assert_eq!(document.http_status(), 400);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_type_becomes_404_error_document() {
    let document = server().handle_http_request(&HttpRequest::get("/others"));

    assert_eq!(document.http_status(), 404);
    let rendered = document.to_json();
    assert_eq!(rendered["errors"][0]["status"], json!("404"));
    assert_eq!(rendered["errors"][0]["title"], json!("Not Found"));
    assert!(rendered.get("data").is_none());
}

#[test]
fn test_unknown_id_becomes_404_error_document() {
    let document = server().handle_http_request(&HttpRequest::get("/tests/unknown"));
    assert_eq!(document.http_status(), 404);
}

#[test]
fn test_missing_media_type_becomes_415_error_document() {
    let request = HttpRequest::builder(HttpMethod::Get, "/tests/test-1").build();
    let document = server().handle_http_request(&request);

    assert_eq!(document.http_status(), 415);
    assert_eq!(
        document.to_json()["errors"][0]["title"],
        json!("Unsupported Media Type")
    );
}

#[test]
fn test_provider_errors_are_sanitized_by_default() {
    let document = server().handle_http_request(&HttpRequest::get("/tests/boom"));

    assert_eq!(document.http_status(), 500);
    let rendered = document.to_json();
    assert_eq!(rendered["errors"][0]["title"], json!("Internal Server Error"));
    assert!(rendered["errors"][0].get("detail").is_none());
}

#[test]
fn test_provider_errors_expose_detail_in_debug_mode() {
    init_tracing();
    let document = debug_server().handle_http_request(&HttpRequest::get("/tests/boom"));

    assert_eq!(document.http_status(), 500);
    let rendered = document.to_json();
    assert_eq!(
        rendered["errors"][0]["detail"],
        json!("database exploded")
    );
    assert_eq!(
        rendered["errors"][0]["meta"]["error"],
        json!("database exploded")
    );
}

#[test]
fn test_write_against_fetch_only_provider_is_forbidden() {
    // a provider without write support: only the fetch operations exist
    struct FetchOnlyProvider;

    impl ResourceProvider for FetchOnlyProvider {
        fn find_resource(
            &self,
            resource_type: &str,
            id: &str,
            _request: &FetchRequest,
        ) -> Result<Resource, JsonApiError> {
            Ok(Resource::new(resource_type, id))
        }

        fn find_resources(
            &self,
            _resource_type: &str,
            _request: &FetchRequest,
        ) -> Result<Vec<Resource>, JsonApiError> {
            Ok(vec![])
        }
    }

    let mut handler = ProviderRequestHandler::new();
    handler.add_provider("tests", FetchOnlyProvider);
    let server = JsonApiServer::new(handler, ServerConfig::default());

    let body = r#"{"data": {"type": "tests", "attributes": {"name": "New"}}}"#;
    let document = server.handle_http_request(&HttpRequest::post("/tests", body));

    assert_eq!(document.http_status(), 403);
    assert_eq!(document.to_json()["errors"][0]["title"], json!("Forbidden"));
}

// ============================================================================
// API prefix
// ============================================================================

#[test]
fn test_prefixed_server_resolves_prefixed_paths() {
    let mut handler = ProviderRequestHandler::new();
    handler.add_provider("tests", AcceptanceProvider);
    let server = JsonApiServer::new(
        handler,
        ServerConfig::builder().api_prefix("api").build().unwrap(),
    );

    let document = server.handle_http_request(&HttpRequest::get("/api/tests/test-1"));
    assert_eq!(document.http_status(), 200);

    let unprefixed = server.handle_http_request(&HttpRequest::get("/tests/test-1"));
    assert_eq!(unprefixed.http_status(), 400);
}
