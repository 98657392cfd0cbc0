//! The resource-graph value model.
//!
//! Providers build [`Resource`] graphs (resources owning [`Relationship`]s
//! which own further, lightweight resources), the engine assembles them
//! into a [`Document`], and an external serializer turns the document's
//! [`Document::to_json`] projection into wire bytes.
//!
//! Every value here is owned: a provider-built graph is finite by
//! construction, and cyclic resource graphs are expressed by repeating a
//! resource identity rather than by reference cycles.

mod document;
mod relationship;
mod resource;

pub use document::{Document, ErrorObject, PrimaryData};
pub use relationship::{Cardinality, Relationship};
pub use resource::{Resource, ResourceIdentity};
