//! Render configuration assembly.

use serde::Serialize;

use crate::query::TemporalAxis;
use crate::style::AttributeMap;

/// The configuration handed to a torque renderer: style attributes merged
/// with the resolved temporal axis.
///
/// Built fresh for every request and never modified afterwards. Serializes
/// as one flat object.
///
/// # Example
///
/// ```rust
/// use torque_config::query::TemporalAxis;
/// use torque_config::render::RenderConfig;
/// use torque_config::style::{AttrKey, AttrValue, AttributeMap};
///
/// let attrs = AttributeMap::new().with(AttrKey::Steps, AttrValue::Number(10.0));
/// let axis = TemporalAxis { start: 0.0, end: 99.0, step: 10.0, data_steps: 100, is_time: false };
/// let config = RenderConfig::assemble(attrs, axis);
///
/// let json = serde_json::to_value(&config).unwrap();
/// assert_eq!(json["steps"], 10.0);
/// assert_eq!(json["data_steps"], 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderConfig {
    #[serde(flatten)]
    attrs: AttributeMap,
    #[serde(flatten)]
    axis: TemporalAxis,
}

impl RenderConfig {
    /// Merges extracted attributes with a resolved axis.
    pub fn assemble(attrs: AttributeMap, axis: TemporalAxis) -> Self {
        Self { attrs, axis }
    }

    pub fn attrs(&self) -> &AttributeMap {
        &self.attrs
    }

    pub fn axis(&self) -> &TemporalAxis {
        &self.axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{AttrKey, AttrValue};
    use serde_json::json;

    #[test]
    fn test_assemble_flattens_both_halves() {
        let attrs = AttributeMap::new()
            .with(AttrKey::Steps, AttrValue::Number(10.0))
            .with(AttrKey::Resolution, AttrValue::Number(4.0))
            .with(AttrKey::CountBy, AttrValue::Text("count".into()))
            .with(AttrKey::Column, AttrValue::Text("ts".into()));
        let axis = TemporalAxis {
            start: 1000.0,
            end: 1990.0,
            step: 99.0,
            data_steps: 50,
            is_time: true,
        };
        let config = RenderConfig::assemble(attrs.clone(), axis);
        assert_eq!(config.attrs(), &attrs);
        assert_eq!(config.axis(), &axis);
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "steps": 10.0,
                "resolution": 4.0,
                "countby": "count",
                "column": "ts",
                "start": 1000.0,
                "end": 1990.0,
                "step": 99.0,
                "data_steps": 50,
                "is_time": true
            })
        );
    }
}
