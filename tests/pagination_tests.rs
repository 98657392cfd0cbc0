//! Integration tests for offset pagination links.

use jsonapi_server::error::JsonApiError;
use jsonapi_server::http::HttpRequest;
use jsonapi_server::model::Document;
use jsonapi_server::pagination::{OffsetPaginationLinkGenerator, PaginationLinkGenerator};
use jsonapi_server::request::FetchRequest;

fn fetch(uri: &str) -> FetchRequest {
    FetchRequest::from_http_request(&HttpRequest::get(uri), "").unwrap()
}

fn paginate(uri: &str, result_count: usize) -> Result<Document, JsonApiError> {
    let mut document = Document::collection(vec![]);
    OffsetPaginationLinkGenerator::new(10).add_pagination_links(
        &mut document,
        &fetch(uri),
        result_count,
    )?;
    Ok(document)
}

#[test]
fn test_first_page_boundary() {
    // totalCount=100, limit=10, offset=0: self, next(10), last(90) present;
    // first and previous absent
    let document = paginate("/tests?page[offset]=0&page[limit]=10", 100).unwrap();

    assert_eq!(
        document.links["self"],
        "/tests?page[offset]=0&page[limit]=10"
    );
    assert_eq!(
        document.links["next"],
        "/tests?page[offset]=10&page[limit]=10"
    );
    assert_eq!(
        document.links["last"],
        "/tests?page[offset]=90&page[limit]=10"
    );
    assert!(!document.links.contains_key("first"));
    assert!(!document.links.contains_key("previous"));
}

#[test]
fn test_offset_validity_boundary() {
    // offset=95 is valid for 100 results (95 <= 99)
    assert!(paginate("/tests?page[offset]=95&page[limit]=10", 100).is_ok());

    // offset=105 exceeds totalCount-1 and must fail
    assert!(matches!(
        paginate("/tests?page[offset]=105&page[limit]=10", 100),
        Err(JsonApiError::MalformedRequest { .. })
    ));
}

#[test]
fn test_middle_page_has_all_five_links() {
    let document = paginate("/tests?page[offset]=40&page[limit]=10", 100).unwrap();

    for name in ["self", "first", "previous", "next", "last"] {
        assert!(document.links.contains_key(name), "missing link '{name}'");
    }
}

#[test]
fn test_previous_is_clamped_to_the_first_page() {
    let document = paginate("/tests?page[offset]=3&page[limit]=10", 100).unwrap();
    assert_eq!(
        document.links["previous"],
        "/tests?page[offset]=0&page[limit]=10"
    );
}

#[test]
fn test_self_link_is_the_verbatim_uri() {
    let uri = "/tests?include=examples&page[offset]=20&page[limit]=10";
    let document = paginate(uri, 100).unwrap();
    assert_eq!(document.links["self"], uri);
}

#[test]
fn test_links_rewrite_only_page_parameters() {
    let document = paginate(
        "/tests?filter[state]=active&sort=-name&page[offset]=20&page[limit]=10",
        100,
    )
    .unwrap();

    for name in ["first", "previous", "next", "last"] {
        let link = &document.links[name];
        assert!(link.contains("filter[state]=active"), "{name}: {link}");
        assert!(link.contains("sort=-name"), "{name}: {link}");
    }
    assert!(document.links["next"].contains("page[offset]=30"));
}

#[test]
fn test_default_limit_is_used_and_not_echoed() {
    let document = paginate("/tests?page[offset]=10", 100).unwrap();
    // links computed with the default limit of 10, without a page[limit] key
    assert_eq!(document.links["next"], "/tests?page[offset]=20");
    assert!(!document.links["next"].contains("limit"));
}

#[test]
fn test_invalid_limit_and_offset_values() {
    assert!(paginate("/tests?page[limit]=0", 100).is_err());
    assert!(paginate("/tests?page[limit]=-5", 100).is_err());
    assert!(paginate("/tests?page[limit]=ten", 100).is_err());
    assert!(paginate("/tests?page[offset]=-1", 100).is_err());
    assert!(paginate("/tests?page[offset]=x", 100).is_err());
}

#[test]
fn test_empty_result_set_accepts_offset_zero() {
    let document = paginate("/tests", 0).unwrap();
    assert!(document.links.contains_key("self"));
    assert_eq!(document.links.len(), 1);
}

#[test]
fn test_short_collection_has_no_pagination_links_beyond_self() {
    // 5 results with limit 10: everything fits one page
    let document = paginate("/tests?page[limit]=10", 5).unwrap();
    assert_eq!(document.links.len(), 1);
    assert!(document.links.contains_key("self"));
}
