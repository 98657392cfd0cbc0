//! Resource providers and their handler adapter.

use std::collections::HashMap;

use crate::error::JsonApiError;
use crate::handler::RequestHandler;
use crate::model::{Cardinality, Document, Relationship, Resource};
use crate::request::{FetchRequest, JsonApiRequest, RelationshipModificationRequest, SaveRequest};

/// A provider of domain data for one or more resource types.
///
/// Providers are the application-side collaborators of the engine: they
/// fetch and mutate domain data and hand back resource graphs; the engine
/// never performs I/O itself. The three find operations are required, the
/// write operations default to [`JsonApiError::NotAllowed`].
///
/// `find_relationship` has a default implementation extracting the
/// relationship from `find_resource`; providers with a cheaper access
/// path can override it.
pub trait ResourceProvider: Send + Sync {
    /// Finds a single resource by type and id.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::ResourceNotFound`] for unknown ids, or any
    /// other taxonomy error.
    fn find_resource(
        &self,
        resource_type: &str,
        id: &str,
        request: &FetchRequest,
    ) -> Result<Resource, JsonApiError>;

    /// Finds all resources of the given type matching the request.
    ///
    /// # Errors
    ///
    /// Returns any taxonomy error.
    fn find_resources(
        &self,
        resource_type: &str,
        request: &FetchRequest,
    ) -> Result<Vec<Resource>, JsonApiError>;

    /// Finds one relationship of a resource.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::ResourceNotFound`] for unknown ids, and
    /// [`JsonApiError::Provider`] when the resource does not carry the
    /// relationship.
    fn find_relationship(
        &self,
        resource_type: &str,
        id: &str,
        relationship: &str,
        request: &FetchRequest,
    ) -> Result<Relationship, JsonApiError> {
        let resource = self.find_resource(resource_type, id, request)?;
        resource.relationship(relationship).cloned().ok_or_else(|| {
            JsonApiError::provider(format!(
                "Relationship '{relationship}' does not exist on {resource_type}/{id}"
            ))
        })
    }

    /// Creates a resource from the request body.
    ///
    /// # Errors
    ///
    /// Defaults to [`JsonApiError::NotAllowed`].
    fn create_resource(&self, request: &SaveRequest) -> Result<Resource, JsonApiError> {
        Err(JsonApiError::not_allowed(request.resource_type(), "create"))
    }

    /// Patches a resource with the request body.
    ///
    /// # Errors
    ///
    /// Defaults to [`JsonApiError::NotAllowed`].
    fn patch_resource(&self, request: &SaveRequest) -> Result<Resource, JsonApiError> {
        Err(JsonApiError::not_allowed(request.resource_type(), "patch"))
    }

    /// Deletes a resource by type and id.
    ///
    /// # Errors
    ///
    /// Defaults to [`JsonApiError::NotAllowed`].
    fn delete_resource(&self, resource_type: &str, id: &str) -> Result<(), JsonApiError> {
        let _ = id;
        Err(JsonApiError::not_allowed(resource_type, "delete"))
    }

    /// Modifies a relationship and returns its new state.
    ///
    /// # Errors
    ///
    /// Defaults to [`JsonApiError::NotAllowed`].
    fn modify_relationship(
        &self,
        request: &RelationshipModificationRequest,
    ) -> Result<Relationship, JsonApiError> {
        Err(JsonApiError::not_allowed(
            request.resource_type(),
            "modify-relationship",
        ))
    }
}

/// Adapts [`ResourceProvider`]s into a [`RequestHandler`].
///
/// Providers register per type; the adapter wraps their results into
/// documents: single or collection primary data by operation, related
/// resources as primary data for relationship fetches (with relationship
/// links and meta copied onto the document), HTTP 201 for creates and 204
/// for deletions.
#[derive(Default)]
pub struct ProviderRequestHandler {
    providers: HashMap<String, Box<dyn ResourceProvider>>,
}

impl std::fmt::Debug for ProviderRequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRequestHandler")
            .field("providers", &format!("<{} providers>", self.providers.len()))
            .finish()
    }
}

impl ProviderRequestHandler {
    /// Creates an adapter without providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider for a resource type, replacing an existing one.
    /// Returns `&mut Self` to allow method chaining.
    pub fn add_provider(
        &mut self,
        resource_type: impl Into<String>,
        provider: impl ResourceProvider + 'static,
    ) -> &mut Self {
        self.providers
            .insert(resource_type.into(), Box::new(provider));
        self
    }

    fn provider(&self, resource_type: &str) -> Result<&dyn ResourceProvider, JsonApiError> {
        self.providers
            .get(resource_type)
            .map(Box::as_ref)
            .ok_or_else(|| JsonApiError::unsupported_type(resource_type))
    }
}

/// Builds the response document for a fetched or modified relationship:
/// related resources become primary data, shaped by the cardinality.
fn relationship_document(relationship: Relationship) -> Document {
    let mut document = match relationship.cardinality {
        Cardinality::Many => Document::collection(relationship.related),
        Cardinality::One => Document::single(relationship.related.into_iter().next()),
    };

    for (name, href) in relationship.links {
        document.links.insert(name, href);
    }
    for (key, value) in relationship.meta {
        document.meta.insert(key, value);
    }

    document
}

impl RequestHandler for ProviderRequestHandler {
    fn fetch_resource(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        let resource = self.provider(request.resource_type())?.find_resource(
            request.resource_type(),
            request.id(),
            request,
        )?;
        Ok(Document::single(Some(resource)))
    }

    fn fetch_resources(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        let resources = self
            .provider(request.resource_type())?
            .find_resources(request.resource_type(), request)?;
        Ok(Document::collection(resources))
    }

    fn fetch_relationship(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        let relationship = self.provider(request.resource_type())?.find_relationship(
            request.resource_type(),
            request.id(),
            request.relationship(),
            request,
        )?;
        Ok(relationship_document(relationship))
    }

    fn save_resource(&self, request: &SaveRequest) -> Result<Document, JsonApiError> {
        let provider = self.provider(request.resource_type())?;

        if request.contains_id() {
            let resource = provider.patch_resource(request)?;
            Ok(Document::single(Some(resource)))
        } else {
            let resource = provider.create_resource(request)?;
            let mut document = Document::single(Some(resource));
            document.set_http_status(201);
            Ok(document)
        }
    }

    fn delete_resource(&self, request: &JsonApiRequest) -> Result<Document, JsonApiError> {
        self.provider(request.resource_type())?
            .delete_resource(request.resource_type(), request.id())?;

        let mut document = Document::single(None);
        document.set_http_status(204);
        Ok(document)
    }

    fn modify_relationship(
        &self,
        request: &RelationshipModificationRequest,
    ) -> Result<Document, JsonApiError> {
        let relationship = self
            .provider(request.resource_type())?
            .modify_relationship(request)?;
        Ok(relationship_document(relationship))
    }
}

// Verify ProviderRequestHandler is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProviderRequestHandler>();
};
