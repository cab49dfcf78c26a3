//! Semantic torque attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::value::{format_number, Literal};

/// The closed set of semantic keys a torque layer reads from its style.
///
/// Variants are declared in the order properties are checked, which decides
/// which key a missing-property error names first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrKey {
    /// Number of animation frames.
    Steps,
    /// Spatial bucket size in pixels.
    Resolution,
    AnimationDuration,
    /// Aggregation function applied per bucket.
    CountBy,
    /// The column the animation runs over.
    Column,
    DataAggregation,
}

impl AttrKey {
    /// Every key, in check order.
    pub const ALL: [AttrKey; 6] = [
        AttrKey::Steps,
        AttrKey::Resolution,
        AttrKey::AnimationDuration,
        AttrKey::CountBy,
        AttrKey::Column,
        AttrKey::DataAggregation,
    ];

    /// Keys the step resolver cannot work without.
    pub const REQUIRED: [AttrKey; 4] = [
        AttrKey::Column,
        AttrKey::Steps,
        AttrKey::Resolution,
        AttrKey::CountBy,
    ];

    /// The key as it appears in the assembled render configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            AttrKey::Steps => "steps",
            AttrKey::Resolution => "resolution",
            AttrKey::AnimationDuration => "animationDuration",
            AttrKey::CountBy => "countby",
            AttrKey::Column => "column",
            AttrKey::DataAggregation => "data_aggregation",
        }
    }

    /// The style property this key is read from.
    pub fn property(self) -> &'static str {
        match self {
            AttrKey::Steps => "-torque-frame-count",
            AttrKey::Resolution => "-torque-resolution",
            AttrKey::AnimationDuration => "-torque-animation-duration",
            AttrKey::CountBy => "-torque-aggregation-function",
            AttrKey::Column => "-torque-time-attribute",
            AttrKey::DataAggregation => "-torque-data-aggregation",
        }
    }

    /// Looks up the key for a style property name.
    pub fn from_property(property: &str) -> Option<AttrKey> {
        AttrKey::ALL.into_iter().find(|k| k.property() == property)
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attribute value in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Number(_) => None,
        }
    }
}

impl From<&Literal> for AttrValue {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(n) => AttrValue::Number(*n),
            other => AttrValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => f.write_str(&format_number(*n)),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Number(n) => serializer.serialize_f64(*n),
            AttrValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Attributes extracted from a layer's style, keyed by semantic key.
///
/// Serializes as a flat object using the keys' [`AttrKey::as_str`] names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    values: BTreeMap<AttrKey, AttrValue>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the updated map for chaining.
    pub fn with(mut self, key: AttrKey, value: AttrValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: AttrKey, value: AttrValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: AttrKey) -> Option<&AttrValue> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: AttrKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Present keys, in check order.
    pub fn keys(&self) -> impl Iterator<Item = AttrKey> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Requested frame count.
    pub fn steps(&self) -> Option<f64> {
        self.number(AttrKey::Steps)
    }

    pub fn resolution(&self) -> Option<f64> {
        self.number(AttrKey::Resolution)
    }

    pub fn animation_duration(&self) -> Option<f64> {
        self.number(AttrKey::AnimationDuration)
    }

    pub fn countby(&self) -> Option<&str> {
        self.text(AttrKey::CountBy)
    }

    /// Name of the column to animate on.
    pub fn column(&self) -> Option<&str> {
        self.text(AttrKey::Column)
    }

    pub fn data_aggregation(&self) -> Option<&str> {
        self.text(AttrKey::DataAggregation)
    }

    fn number(&self, key: AttrKey) -> Option<f64> {
        self.get(key).and_then(AttrValue::as_number)
    }

    fn text(&self, key: AttrKey) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_text)
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}
