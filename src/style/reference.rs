//! Reference schema for style properties.
//!
//! The schema maps a property name to the type its value must have. The
//! bundled torque reference is parsed once, on first use, and shared
//! read-only by every extractor in the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Expected type of a style property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Number,
    Float,
    String,
    Color,
    /// A closed set of accepted keywords.
    Keywords(Vec<String>),
    /// Any type the extractor does not validate (`uri`, `functions`, ...).
    Other(String),
}

impl SchemaType {
    fn from_name(name: &str) -> Self {
        match name {
            "number" => SchemaType::Number,
            "float" => SchemaType::Float,
            "string" => SchemaType::String,
            "color" => SchemaType::Color,
            other => SchemaType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Number => f.write_str("number"),
            SchemaType::Float => f.write_str("float"),
            SchemaType::String => f.write_str("string"),
            SchemaType::Color => f.write_str("color"),
            SchemaType::Keywords(set) => write!(f, "one of [{}]", set.join(", ")),
            SchemaType::Other(name) => f.write_str(name),
        }
    }
}

/// Source of expected property types.
///
/// # Example
///
/// ```rust
/// use torque_config::style::{ReferenceSchema, SchemaType};
///
/// struct Fixed;
///
/// impl ReferenceSchema for Fixed {
///     fn schema_for(&self, property: &str) -> Option<&SchemaType> {
///         static NUMBER: SchemaType = SchemaType::Number;
///         (property == "-torque-frame-count").then_some(&NUMBER)
///     }
/// }
///
/// assert_eq!(Fixed.schema_for("-torque-frame-count"), Some(&SchemaType::Number));
/// assert_eq!(Fixed.schema_for("marker-fill"), None);
/// ```
pub trait ReferenceSchema: Send + Sync {
    /// Returns the expected type of `property`, or `None` if it is unknown.
    fn schema_for(&self, property: &str) -> Option<&SchemaType>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawType {
    Name(String),
    Keywords(Vec<String>),
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    kind: RawType,
}

#[derive(Deserialize)]
struct RawReference {
    version: String,
    #[serde(default)]
    map: HashMap<String, RawProperty>,
    #[serde(default)]
    layer: HashMap<String, RawProperty>,
}

/// A reference schema read from the torque reference JSON format.
///
/// The document has a `version` and two property tables, `map` and `layer`,
/// each mapping a property name to an object with a `type` that is either a
/// type name or an array of accepted keywords.
#[derive(Debug, Clone)]
pub struct TorqueReference {
    version: String,
    properties: HashMap<String, SchemaType>,
}

const BUNDLED_REFERENCE: &str = include_str!("reference.json");

static REFERENCE: Lazy<Arc<TorqueReference>> = Lazy::new(|| {
    // The bundled document is covered by tests; a broken edit fails them loudly.
    Arc::new(TorqueReference::from_json(BUNDLED_REFERENCE).expect("bundled reference is valid"))
});

impl TorqueReference {
    /// Parses a reference document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawReference = serde_json::from_str(json)?;
        let properties = raw
            .map
            .into_iter()
            .chain(raw.layer)
            .map(|(name, prop)| {
                let kind = match prop.kind {
                    RawType::Name(name) => SchemaType::from_name(&name),
                    RawType::Keywords(set) => SchemaType::Keywords(set),
                };
                (name, kind)
            })
            .collect();
        Ok(Self {
            version: raw.version,
            properties,
        })
    }

    /// Returns the process-wide bundled reference.
    pub fn bundled() -> Arc<TorqueReference> {
        Arc::clone(&REFERENCE)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of properties described by this reference.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl ReferenceSchema for TorqueReference {
    fn schema_for(&self, property: &str) -> Option<&SchemaType> {
        self.properties.get(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_reference_parses() {
        let reference = TorqueReference::bundled();
        assert_eq!(reference.version(), "1.0.0");
        assert!(!reference.is_empty());
    }

    #[test]
    fn test_bundled_reference_is_shared() {
        let a = TorqueReference::bundled();
        let b = TorqueReference::bundled();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_bundled_torque_properties() {
        let reference = TorqueReference::bundled();
        assert_eq!(
            reference.schema_for("-torque-frame-count"),
            Some(&SchemaType::Number)
        );
        assert_eq!(
            reference.schema_for("-torque-time-attribute"),
            Some(&SchemaType::String)
        );
        assert_eq!(
            reference.schema_for("-torque-data-aggregation"),
            Some(&SchemaType::Keywords(vec![
                "linear".to_string(),
                "cumulative".to_string()
            ]))
        );
        assert_eq!(
            reference.schema_for("marker-fill"),
            Some(&SchemaType::Color)
        );
        assert_eq!(
            reference.schema_for("marker-file"),
            Some(&SchemaType::Other("uri".to_string()))
        );
        assert_eq!(reference.schema_for("-torque-unknown"), None);
    }

    #[test]
    fn test_from_json_custom() {
        let reference = TorqueReference::from_json(
            r#"{"version": "2", "map": {"x": {"type": "float"}}}"#,
        )
        .unwrap();
        assert_eq!(reference.len(), 1);
        assert_eq!(reference.schema_for("x"), Some(&SchemaType::Float));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(TorqueReference::from_json("{").is_err());
        assert!(TorqueReference::from_json(r#"{"map": {}}"#).is_err());
    }

    #[test]
    fn test_schema_type_display() {
        assert_eq!(SchemaType::Number.to_string(), "number");
        assert_eq!(
            SchemaType::Keywords(vec!["a".into(), "b".into()]).to_string(),
            "one of [a, b]"
        );
    }
}
