//! Relationships between resources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::JsonApiError;
use crate::model::resource::links_json;
use crate::model::Resource;

/// Whether a relationship targets a single resource or a collection.
///
/// The cardinality decides how empty relationship linkage renders:
/// `data: null` for [`One`](Self::One), `data: []` for [`Many`](Self::Many).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// A to-one relationship.
    One,
    /// A to-many relationship.
    Many,
}

/// A named relationship on a resource.
///
/// The relationship owns its related resources. Related resources may carry
/// nested relationships of their own, which is how providers hand the
/// engine multi-level graphs in a single response.
#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
    /// The relationship name.
    pub name: String,
    /// Whether this is a to-one or to-many relationship.
    pub cardinality: Cardinality,
    /// The related resources. Holds at most one entry for
    /// [`Cardinality::One`].
    pub related: Vec<Resource>,
    /// Relationship-level links.
    pub links: BTreeMap<String, String>,
    /// Relationship-level meta information.
    pub meta: Map<String, Value>,
}

impl Relationship {
    /// Creates a to-one relationship.
    pub fn to_one(name: impl Into<String>, related: Option<Resource>) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::One,
            related: related.into_iter().collect(),
            links: BTreeMap::new(),
            meta: Map::new(),
        }
    }

    /// Creates a to-many relationship.
    pub fn to_many(name: impl Into<String>, related: Vec<Resource>) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::Many,
            related,
            links: BTreeMap::new(),
            meta: Map::new(),
        }
    }

    /// Returns the first related resource, if any.
    #[must_use]
    pub fn first_related(&self) -> Option<&Resource> {
        self.related.first()
    }

    /// Renders this relationship as a linkage object.
    ///
    /// Related resources render as identifier objects; a to-one
    /// relationship without related data renders `data: null`, a to-many
    /// without related data renders `data: []`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let data = match self.cardinality {
            Cardinality::One => self
                .first_related()
                .map_or(Value::Null, Resource::identifier_json),
            Cardinality::Many => {
                Value::Array(self.related.iter().map(Resource::identifier_json).collect())
            }
        };

        let mut object = Map::new();
        object.insert("data".to_string(), data);

        if !self.links.is_empty() {
            object.insert("links".to_string(), links_json(&self.links));
        }

        if !self.meta.is_empty() {
            object.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }

        Value::Object(object)
    }

    /// Parses a relationship from a linkage object in a request body.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::MalformedRequest`] when the value is not an
    /// object with a `data` member, or the linkage entries are not valid
    /// identifier objects.
    pub fn from_json(name: &str, value: &Value) -> Result<Self, JsonApiError> {
        let data = value
            .as_object()
            .and_then(|object| object.get("data"))
            .ok_or_else(|| {
                JsonApiError::malformed(format!("Relationship '{name}' requires a 'data' member"))
            })?;

        match data {
            Value::Null => Ok(Self::to_one(name, None)),
            Value::Object(_) => Ok(Self::to_one(name, Some(identifier_from_json(data)?))),
            Value::Array(entries) => {
                let related = entries
                    .iter()
                    .map(identifier_from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::to_many(name, related))
            }
            _ => Err(JsonApiError::malformed(format!(
                "Relationship '{name}' has invalid linkage data"
            ))),
        }
    }
}

fn identifier_from_json(value: &Value) -> Result<Resource, JsonApiError> {
    let object = value
        .as_object()
        .ok_or_else(|| JsonApiError::malformed("Resource identifier must be an object"))?;

    let resource_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonApiError::malformed("Resource identifier requires a string 'type'"))?;
    let id = object
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonApiError::malformed("Resource identifier requires a string 'id'"))?;

    Ok(Resource::new(resource_type, id))
}

// Verify Relationship is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Cardinality>();
    assert_send_sync::<Relationship>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_to_one_renders_null_data() {
        let relationship = Relationship::to_one("owner", None);
        assert_eq!(relationship.to_json(), json!({"data": null}));
    }

    #[test]
    fn test_empty_to_many_renders_empty_array() {
        let relationship = Relationship::to_many("examples", vec![]);
        assert_eq!(relationship.to_json(), json!({"data": []}));
    }

    #[test]
    fn test_related_resources_render_as_identifiers() {
        let full = Resource::new("examples", "example-1").with_attribute("name", json!("x"));
        let relationship = Relationship::to_many("examples", vec![full]);

        assert_eq!(
            relationship.to_json(),
            json!({"data": [{"type": "examples", "id": "example-1"}]})
        );
    }

    #[test]
    fn test_from_json_parses_all_linkage_shapes() {
        let to_one = Relationship::from_json("a", &json!({"data": {"type": "t", "id": "1"}}));
        assert_eq!(to_one.unwrap().cardinality, Cardinality::One);

        let empty_one = Relationship::from_json("a", &json!({"data": null})).unwrap();
        assert_eq!(empty_one.cardinality, Cardinality::One);
        assert!(empty_one.related.is_empty());

        let to_many = Relationship::from_json(
            "a",
            &json!({"data": [{"type": "t", "id": "1"}, {"type": "t", "id": "2"}]}),
        )
        .unwrap();
        assert_eq!(to_many.cardinality, Cardinality::Many);
        assert_eq!(to_many.related.len(), 2);
    }

    #[test]
    fn test_from_json_rejects_invalid_linkage() {
        assert!(Relationship::from_json("a", &json!({})).is_err());
        assert!(Relationship::from_json("a", &json!({"data": 5})).is_err());
        assert!(Relationship::from_json("a", &json!({"data": [{"type": "t"}]})).is_err());
    }
}
