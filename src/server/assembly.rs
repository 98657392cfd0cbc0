//! Compound document assembly.
//!
//! After a handler returns primary data, [`assemble`] walks the resource
//! graph with the fetch directive: it filters attributes against sparse
//! fieldsets, derives one sub-directive per relationship, side-loads
//! requested related resources into `included` (deduplicated by identity),
//! and strips relationship maps from identifiers-only responses.
//!
//! Resource graphs are owned values, so every traversal is finite; cyclic
//! graphs — a resource reachable again under its own identity — are
//! handled by the identity check on insertion, which keeps `included` free
//! of duplicates.

use crate::model::{Document, Resource};
use crate::request::FetchRequest;

/// Assembles a document in place for the given fetch directive.
///
/// Each primary resource is processed in three steps: attribute filtering,
/// relationship traversal (which fills `included`), and relationship
/// stripping for identifiers-only responses. Already-present `included`
/// entries are kept and merged against.
pub fn assemble(document: &mut Document, request: &FetchRequest) {
    let mut included = std::mem::take(&mut document.included);

    for resource in document.primary_resources_mut() {
        remove_unrequested_attributes(resource, request);
        include_related(&mut included, resource, request);
        remove_unrequested_relationships(resource, request);
    }

    document.included = included;
}

/// Drops every attribute the directive does not request: all of them for
/// identifiers-only responses, those outside the type's fieldset otherwise.
fn remove_unrequested_attributes(resource: &mut Resource, request: &FetchRequest) {
    if !request.requested_resource_body() {
        resource.attributes.clear();
        return;
    }

    let resource_type = resource.resource_type.clone();
    resource
        .attributes
        .retain(|name, _| request.requested_field(&resource_type, name));
}

/// Clears the relationship map of identifiers-only responses.
fn remove_unrequested_relationships(resource: &mut Resource, request: &FetchRequest) {
    if !request.requested_resource_body() {
        resource.relationships.clear();
    }
}

/// Walks the relationships of one resource, recursively processing related
/// resources with the derived sub-directive and side-loading the included
/// ones.
fn include_related(included: &mut Vec<Resource>, resource: &mut Resource, request: &FetchRequest) {
    for relationship in &mut resource.relationships {
        let should_include = request.requested_include(&relationship.name);
        let sub_request = request.sub_request(&relationship.name, false);

        for related in &mut relationship.related {
            remove_unrequested_attributes(related, &sub_request);
            include_related(included, related, &sub_request);

            if should_include {
                insert_or_merge_included(included, related);
            }

            remove_unrequested_relationships(related, &sub_request);
        }
    }
}

/// Inserts a resource into `included`, deduplicating by identity.
///
/// A second occurrence of an identity contributes only the relationships
/// the stored copy lacks; conflicting data stays first-seen.
fn insert_or_merge_included(included: &mut Vec<Resource>, resource: &Resource) {
    let stored = included.iter_mut().find(|stored| {
        stored.resource_type == resource.resource_type && stored.id == resource.id
    });

    match stored {
        Some(stored) => {
            for relationship in &resource.relationships {
                if stored.relationship(&relationship.name).is_none() {
                    stored.relationships.push(relationship.clone());
                }
            }
        }
        None => included.push(resource.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpRequest;
    use crate::model::Relationship;
    use serde_json::json;

    fn fetch(uri: &str) -> FetchRequest {
        FetchRequest::from_http_request(&HttpRequest::get(uri), "").unwrap()
    }

    fn example_resource(id: &str) -> Resource {
        Resource::new("examples", id).with_attribute("title", json!("Example"))
    }

    #[test]
    fn test_included_resources_keep_attributes() {
        let resource = Resource::new("tests", "test-1")
            .with_attribute("name", json!("Test"))
            .with_relationship(Relationship::to_many(
                "examples",
                vec![example_resource("example-1")],
            ));
        let mut document = Document::single(Some(resource));

        assemble(&mut document, &fetch("/tests/test-1?include=examples"));

        assert_eq!(document.included.len(), 1);
        assert_eq!(
            document.included[0].attributes.get("title"),
            Some(&json!("Example"))
        );
    }

    #[test]
    fn test_unincluded_relationships_are_not_side_loaded() {
        let resource = Resource::new("tests", "test-1").with_relationship(
            Relationship::to_many("examples", vec![example_resource("example-1")]),
        );
        let mut document = Document::single(Some(resource));

        assemble(&mut document, &fetch("/tests/test-1"));

        assert!(document.included.is_empty());
        // the relationship itself stays visible as linkage
        assert!(document.primary_resources()[0]
            .relationship("examples")
            .is_some());
    }

    #[test]
    fn test_duplicate_identities_merge_missing_relationships() {
        // the same example is reachable via two relationships; the second
        // occurrence carries a relationship the first lacks
        let bare = example_resource("example-1");
        let with_server = example_resource("example-1").with_relationship(Relationship::to_one(
            "server",
            Some(Resource::new("servers", "s-1")),
        ));

        let resource = Resource::new("tests", "test-1")
            .with_relationship(Relationship::to_many("examples", vec![bare]))
            .with_relationship(Relationship::to_many("more", vec![with_server]));
        let mut document = Document::single(Some(resource));

        assemble(&mut document, &fetch("/tests/test-1?include=examples,more"));

        assert_eq!(document.included.len(), 1);
        assert!(document.included[0].relationship("server").is_some());
    }

    #[test]
    fn test_self_cycle_terminates_with_single_entry() {
        let inner = Resource::new("tests", "test-1");
        let resource = Resource::new("tests", "test-1")
            .with_attribute("name", json!("Test"))
            .with_relationship(Relationship::to_one("selfRef", Some(inner)));
        let mut document = Document::single(Some(resource));

        assemble(&mut document, &fetch("/tests/test-1?include=selfRef"));

        assert_eq!(document.included.len(), 1);
        assert_eq!(document.included[0].id, "test-1");
    }
}
