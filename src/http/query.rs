//! Query-string codec with support for bracketed parameters.
//!
//! The protocol's query conventions use one level of bracket nesting:
//! `fields[tests]=name`, `filter[state]=active`, `page[offset]=10`. This
//! module parses such strings into an ordered [`QueryParams`] collection
//! and re-encodes them, which is how pagination links preserve every
//! original parameter while rewriting only the `page[...]` keys.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_server::http::QueryParams;
//!
//! let mut params = QueryParams::parse("include=a,b&page[offset]=10").unwrap();
//! assert_eq!(params.scalar("include"), Some("a,b"));
//!
//! params.set_nested_entry("page", "offset", "20");
//! assert_eq!(params.encode(), "include=a%2Cb&page[offset]=20");
//! ```

use crate::error::JsonApiError;

/// The value of a single query parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    /// A plain `name=value` parameter.
    Scalar(String),
    /// A bracketed `name[sub]=value` parameter group, insertion-ordered.
    Nested(Vec<(String, String)>),
}

/// An ordered collection of parsed query parameters.
///
/// Parameters keep their first-seen order, which keeps re-encoded query
/// strings (and therefore pagination links) deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    /// Parses a raw query string (without the leading `?`).
    ///
    /// Percent-encoding and `+`-encoded spaces are decoded. Repeated scalar
    /// parameters keep the last value; repeated `name[sub]` entries keep the
    /// last value for that sub key.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::MalformedRequest`] naming the parameter when
    /// a name nests deeper than one bracket level, carries an empty sub key,
    /// or mixes scalar and bracketed forms.
    pub fn parse(query: &str) -> Result<Self, JsonApiError> {
        let mut params = Self::default();

        for piece in query.split('&').filter(|piece| !piece.is_empty()) {
            let (raw_name, raw_value) = piece.split_once('=').unwrap_or((piece, ""));
            let name = decode_component(raw_name)?;
            let value = decode_component(raw_value)?;

            match split_bracketed(&name)? {
                Some((outer, sub)) => params.set_nested_checked(outer, sub, &value)?,
                None => params.set_scalar_checked(&name, &value)?,
            }
        }

        Ok(params)
    }

    /// Returns the raw value of a parameter, if present.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value)
    }

    /// Returns the scalar value of a parameter, or `None` if the parameter
    /// is absent or bracketed.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.value(name) {
            Some(QueryValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the bracketed entries of a parameter, or `None` if the
    /// parameter is absent or scalar.
    #[must_use]
    pub fn nested(&self, name: &str) -> Option<&[(String, String)]> {
        match self.value(name) {
            Some(QueryValue::Nested(entries)) => Some(entries),
            _ => None,
        }
    }

    /// Removes a parameter and all its bracketed entries.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(entry_name, _)| entry_name != name);
    }

    /// Sets a scalar parameter, replacing any existing value.
    pub fn set_scalar(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, QueryValue::Scalar(value.into())));
    }

    /// Sets one `name[sub]` entry, replacing an existing entry for the same
    /// sub key and converting a scalar parameter of the same name if needed.
    pub fn set_nested_entry(
        &mut self,
        name: impl Into<String>,
        sub: impl Into<String>,
        value: impl Into<String>,
    ) {
        let name = name.into();
        let sub = sub.into();
        let value = value.into();

        if !matches!(self.value(&name), Some(QueryValue::Nested(_))) {
            self.remove(&name);
            self.entries
                .push((name.clone(), QueryValue::Nested(Vec::new())));
        }

        let Some((_, QueryValue::Nested(entries))) = self
            .entries
            .iter_mut()
            .find(|(entry_name, _)| *entry_name == name)
        else {
            unreachable!("nested entry ensured above");
        };

        if let Some(entry) = entries.iter_mut().find(|(entry_sub, _)| *entry_sub == sub) {
            entry.1 = value;
        } else {
            entries.push((sub, value));
        }
    }

    /// Returns `true` when no parameters are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-encodes the parameters into a query string.
    ///
    /// Names, sub keys and values are percent-encoded; brackets are emitted
    /// literally (`page[offset]=10`).
    #[must_use]
    pub fn encode(&self) -> String {
        let mut pieces = Vec::new();

        for (name, value) in &self.entries {
            match value {
                QueryValue::Scalar(scalar) => {
                    pieces.push(format!(
                        "{}={}",
                        urlencoding::encode(name),
                        urlencoding::encode(scalar)
                    ));
                }
                QueryValue::Nested(entries) => {
                    for (sub, entry_value) in entries {
                        pieces.push(format!(
                            "{}[{}]={}",
                            urlencoding::encode(name),
                            urlencoding::encode(sub),
                            urlencoding::encode(entry_value)
                        ));
                    }
                }
            }
        }

        pieces.join("&")
    }

    fn set_scalar_checked(&mut self, name: &str, value: &str) -> Result<(), JsonApiError> {
        if matches!(self.value(name), Some(QueryValue::Nested(_))) {
            return Err(mixed_forms_error(name));
        }
        self.set_scalar(name, value);
        Ok(())
    }

    fn set_nested_checked(
        &mut self,
        name: &str,
        sub: &str,
        value: &str,
    ) -> Result<(), JsonApiError> {
        if matches!(self.value(name), Some(QueryValue::Scalar(_))) {
            return Err(mixed_forms_error(name));
        }
        self.set_nested_entry(name, sub, value);
        Ok(())
    }
}

fn mixed_forms_error(name: &str) -> JsonApiError {
    JsonApiError::malformed(format!(
        "Parameter '{name}' mixes scalar and bracketed forms"
    ))
}

/// Splits `name[sub]` into its parts, or returns `None` for a plain name.
///
/// A single bracket level with a non-empty sub key is the only accepted
/// bracketed shape.
fn split_bracketed(name: &str) -> Result<Option<(&str, &str)>, JsonApiError> {
    let Some(open) = name.find('[') else {
        if name.contains(']') {
            return Err(JsonApiError::malformed(format!(
                "Invalid parameter name '{name}'"
            )));
        }
        return Ok(None);
    };

    let outer = &name[..open];
    let rest = &name[open + 1..];

    let valid = !outer.is_empty()
        && rest.ends_with(']')
        && !rest[..rest.len() - 1].is_empty()
        && !rest[..rest.len() - 1].contains(['[', ']']);
    if !valid {
        return Err(JsonApiError::malformed(format!(
            "Invalid parameter name '{name}'"
        )));
    }

    Ok(Some((outer, &rest[..rest.len() - 1])))
}

fn decode_component(raw: &str) -> Result<String, JsonApiError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| JsonApiError::malformed(format!("Invalid percent-encoding in '{raw}'")))
}

// Verify QueryParams is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QueryParams>();
    assert_send_sync::<QueryValue>();
};
