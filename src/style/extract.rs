//! Torque attribute extraction from CartoCSS.
//!
//! Extraction runs in three steps:
//!
//! 1. **Parse**: the style text becomes rule blocks via a [`StyleParser`]
//! 2. **Flatten**: declarations of every top-level `Map` block are merged,
//!    later declarations overwriting earlier ones
//! 3. **Validate**: each torque property found is checked against the
//!    [`ReferenceSchema`] and stored under its semantic [`AttrKey`]
//!
//! No I/O happens here; a failed extraction never reaches the data source.

use std::collections::HashMap;
use std::sync::Arc;

use super::attrs::{AttrKey, AttrValue, AttributeMap};
use super::error::StyleError;
use super::parser::{CartoParser, StyleParser};
use super::reference::{ReferenceSchema, SchemaType, TorqueReference};
use super::value::Literal;

/// Keyword accepted for every enumerated property, whatever its declared set.
pub const ENUM_FALLBACK: &str = "linear";

/// Extracts and validates torque attributes from style text.
///
/// # Example
///
/// ```rust
/// use torque_config::style::{AttrKey, StyleExtractor};
///
/// let extractor = StyleExtractor::new();
/// let attrs = extractor
///     .extract(
///         Some("Map { -torque-frame-count: 10; -torque-time-attribute: ts; }"),
///         &[AttrKey::Steps, AttrKey::Column],
///     )
///     .unwrap();
///
/// assert_eq!(attrs.steps(), Some(10.0));
/// assert_eq!(attrs.column(), Some("ts"));
/// ```
#[derive(Clone)]
pub struct StyleExtractor {
    parser: Arc<dyn StyleParser>,
    schema: Arc<dyn ReferenceSchema>,
}

impl StyleExtractor {
    /// Creates an extractor using CartoCSS and the bundled torque reference.
    pub fn new() -> Self {
        Self {
            parser: Arc::new(CartoParser::new()),
            schema: TorqueReference::bundled(),
        }
    }

    /// Replaces the style grammar.
    pub fn with_parser(mut self, parser: impl StyleParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Replaces the reference schema.
    pub fn with_schema(mut self, schema: Arc<dyn ReferenceSchema>) -> Self {
        self.schema = schema;
        self
    }

    /// Extracts the torque attributes of `style`.
    ///
    /// # Errors
    ///
    /// - [`StyleError::MissingStyle`] if `style` is `None`
    /// - [`StyleError::Syntax`] if parsing failed badly enough to hide every `Map` block
    /// - [`StyleError::TypeMismatch`] for the first property of the wrong type
    /// - [`StyleError::MissingProperty`] for the first absent key of `required`
    pub fn extract(
        &self,
        style: Option<&str>,
        required: &[AttrKey],
    ) -> Result<AttributeMap, StyleError> {
        let style = style.ok_or(StyleError::MissingStyle)?;
        let parsed = self.parser.parse(style);

        for error in &parsed.errors {
            log::warn!("torque style: {}", error);
        }
        if parsed.map_blocks().next().is_none() && !parsed.errors.is_empty() {
            return Err(StyleError::Syntax {
                errors: parsed.errors,
            });
        }

        let mut declared: HashMap<&str, &Literal> = HashMap::new();
        for block in parsed.map_blocks() {
            for decl in &block.declarations {
                declared.insert(decl.name.as_str(), &decl.value);
            }
        }

        let mut attrs = AttributeMap::new();
        for key in AttrKey::ALL {
            let property = key.property();
            match declared.get(property) {
                Some(value) => {
                    if let Some(expected) = self.schema.schema_for(property) {
                        if !matches_type(value, expected) {
                            return Err(StyleError::TypeMismatch {
                                property: property.to_string(),
                                expected: expected.clone(),
                                found: value.kind(),
                            });
                        }
                    }
                    attrs.insert(key, AttrValue::from(*value));
                }
                None if required.contains(&key) => {
                    return Err(StyleError::MissingProperty { key });
                }
                None => {}
            }
        }

        log::debug!("torque style: extracted {} attributes", attrs.len());
        Ok(attrs)
    }
}

impl Default for StyleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StyleExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleExtractor").finish_non_exhaustive()
    }
}

/// Extracts attributes with the default extractor, requiring every key
/// the step resolver needs.
pub fn attrs_from_cartocss(style: Option<&str>) -> Result<AttributeMap, StyleError> {
    StyleExtractor::new().extract(style, &AttrKey::REQUIRED)
}

/// Checks a literal against a schema type.
pub fn matches_type(value: &Literal, expected: &SchemaType) -> bool {
    match expected {
        SchemaType::Number | SchemaType::Float => matches!(value, Literal::Number(_)),
        SchemaType::String => value.as_text().is_some_and(|s| s != "undefined"),
        SchemaType::Keywords(set) => value
            .as_text()
            .is_some_and(|s| s == ENUM_FALLBACK || set.iter().any(|k| k == s)),
        SchemaType::Color => is_color(value),
        SchemaType::Other(_) => true,
    }
}

fn is_color(value: &Literal) -> bool {
    if value.rgba().is_some() {
        return true;
    }
    match value {
        Literal::Call { name, args } => {
            let expected = match name.as_str() {
                "rgb" | "hsl" => 3,
                "rgba" | "hsla" => 4,
                _ => return false,
            };
            args.len() == expected
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgba;

    const FULL: &str = r#"
        Map {
            -torque-frame-count: 10;
            -torque-resolution: 4;
            -torque-animation-duration: 30;
            -torque-aggregation-function: "count(cartodb_id)";
            -torque-time-attribute: "ts";
            -torque-data-aggregation: cumulative;
        }
        #layer { marker-fill: #f00; }
    "#;

    fn extract(style: &str) -> Result<AttributeMap, StyleError> {
        StyleExtractor::new().extract(Some(style), &AttrKey::REQUIRED)
    }

    #[test]
    fn test_extract_all_six() {
        let attrs = extract(FULL).unwrap();
        assert_eq!(attrs.len(), 6);
        assert_eq!(attrs.keys().collect::<Vec<_>>(), AttrKey::ALL.to_vec());
        assert_eq!(attrs.steps(), Some(10.0));
        assert_eq!(attrs.resolution(), Some(4.0));
        assert_eq!(attrs.animation_duration(), Some(30.0));
        assert_eq!(attrs.countby(), Some("count(cartodb_id)"));
        assert_eq!(attrs.column(), Some("ts"));
        assert_eq!(attrs.data_aggregation(), Some("cumulative"));
    }

    #[test]
    fn test_extract_missing_style() {
        let err = StyleExtractor::new()
            .extract(None, &AttrKey::REQUIRED)
            .unwrap_err();
        assert_eq!(err, StyleError::MissingStyle);
    }

    #[test]
    fn test_extract_missing_required_names_first_key() {
        let err = extract("Map { -torque-time-attribute: ts; }").unwrap_err();
        assert_eq!(
            err,
            StyleError::MissingProperty {
                key: AttrKey::Steps
            }
        );
    }

    #[test]
    fn test_extract_optional_keys_are_omitted() {
        let attrs = extract(
            "Map { -torque-frame-count: 1; -torque-resolution: 1; \
             -torque-aggregation-function: count; -torque-time-attribute: ts; }",
        )
        .unwrap();
        assert_eq!(attrs.len(), 4);
        assert!(!attrs.contains(AttrKey::AnimationDuration));
        assert!(!attrs.contains(AttrKey::DataAggregation));
    }

    #[test]
    fn test_extract_nothing_required() {
        let attrs = StyleExtractor::new()
            .extract(Some("#layer { marker-width: 2; }"), &[])
            .unwrap();
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_extract_ignores_non_map_blocks() {
        let err = extract(
            "#layer { -torque-frame-count: 10; -torque-resolution: 1; \
             -torque-aggregation-function: count; -torque-time-attribute: ts; }",
        )
        .unwrap_err();
        assert!(matches!(err, StyleError::MissingProperty { .. }));
    }

    #[test]
    fn test_extract_last_declaration_wins() {
        let style = format!("{}\nMap {{ -torque-frame-count: 64; }}", FULL);
        let attrs = extract(&style).unwrap();
        assert_eq!(attrs.steps(), Some(64.0));
    }

    #[test]
    fn test_extract_type_mismatch_number() {
        let err = extract("Map { -torque-frame-count: \"ten\"; }").unwrap_err();
        assert_eq!(
            err,
            StyleError::TypeMismatch {
                property: "-torque-frame-count".into(),
                expected: SchemaType::Number,
                found: "string",
            }
        );
    }

    #[test]
    fn test_extract_type_mismatch_string() {
        let err = extract("Map { -torque-frame-count: 1; -torque-resolution: 1; -torque-aggregation-function: 3; }")
            .unwrap_err();
        assert!(matches!(
            err,
            StyleError::TypeMismatch { ref property, .. } if property == "-torque-aggregation-function"
        ));
    }

    #[test]
    fn test_extract_type_mismatch_enum() {
        let err = extract(&FULL.replace("cumulative", "sideways")).unwrap_err();
        assert!(matches!(
            err,
            StyleError::TypeMismatch { found: "keyword", .. }
        ));
    }

    #[test]
    fn test_extract_linear_always_accepted() {
        let attrs = extract(&FULL.replace("cumulative", "linear")).unwrap();
        assert_eq!(attrs.data_aggregation(), Some("linear"));
    }

    #[test]
    fn test_extract_variables() {
        let style = "@frames: 12;\n@col: \"updated_at\";\n\
                     Map { -torque-frame-count: @frames; -torque-resolution: 2; \
                     -torque-aggregation-function: count; -torque-time-attribute: @col; }";
        let attrs = extract(style).unwrap();
        assert_eq!(attrs.steps(), Some(12.0));
        assert_eq!(attrs.column(), Some("updated_at"));
    }

    #[test]
    fn test_extract_tolerates_parse_errors_elsewhere() {
        let style = format!("#layer {{ marker-fill: #nothex; }}\n{}", FULL);
        assert_eq!(extract(&style).unwrap().len(), 6);
    }

    #[test]
    fn test_extract_syntax_error_without_map() {
        let err = extract("} -torque-frame-count: 10;").unwrap_err();
        match err {
            StyleError::Syntax { errors } => assert_eq!(errors.len(), 2),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_with_custom_schema() {
        let schema = TorqueReference::from_json(
            r#"{"version": "t", "map": {"-torque-frame-count": {"type": "color"}}}"#,
        )
        .unwrap();
        let extractor = StyleExtractor::new().with_schema(Arc::new(schema));
        let err = extractor
            .extract(Some("Map { -torque-frame-count: 10; }"), &[])
            .unwrap_err();
        assert_eq!(
            err,
            StyleError::TypeMismatch {
                property: "-torque-frame-count".into(),
                expected: SchemaType::Color,
                found: "number",
            }
        );
        let attrs = extractor
            .extract(Some("Map { -torque-frame-count: rgb(1, 2, 3); }"), &[])
            .unwrap();
        assert_eq!(
            attrs.get(AttrKey::Steps),
            Some(&AttrValue::Text("rgb(1, 2, 3)".into()))
        );
    }

    #[test]
    fn test_matches_type_numbers() {
        assert!(matches_type(&Literal::Number(1.0), &SchemaType::Number));
        assert!(matches_type(&Literal::Number(1.5), &SchemaType::Float));
        assert!(!matches_type(&Literal::Keyword("1".into()), &SchemaType::Float));
    }

    #[test]
    fn test_matches_type_strings() {
        assert!(matches_type(&Literal::String("a".into()), &SchemaType::String));
        assert!(matches_type(&Literal::Keyword("a".into()), &SchemaType::String));
        assert!(!matches_type(
            &Literal::Keyword("undefined".into()),
            &SchemaType::String
        ));
        assert!(!matches_type(&Literal::Number(1.0), &SchemaType::String));
    }

    #[test]
    fn test_matches_type_keywords() {
        let set = SchemaType::Keywords(vec!["a".into(), "b".into()]);
        assert!(matches_type(&Literal::Keyword("a".into()), &set));
        assert!(!matches_type(&Literal::Keyword("c".into()), &set));
        assert!(matches_type(&Literal::Keyword("linear".into()), &set));
        assert!(matches_type(
            &Literal::Keyword("linear".into()),
            &SchemaType::Keywords(vec![])
        ));
        assert!(!matches_type(&Literal::Number(1.0), &set));
    }

    #[test]
    fn test_matches_type_colors() {
        let call = |name: &str, n: usize| Literal::Call {
            name: name.into(),
            args: vec![Literal::Number(0.0); n],
        };
        assert!(matches_type(
            &Literal::Color(Rgba::rgb(1, 2, 3)),
            &SchemaType::Color
        ));
        assert!(matches_type(&call("rgb", 3), &SchemaType::Color));
        assert!(matches_type(&call("hsl", 3), &SchemaType::Color));
        assert!(matches_type(&call("rgba", 4), &SchemaType::Color));
        assert!(matches_type(&call("hsla", 4), &SchemaType::Color));
        assert!(!matches_type(&call("rgb", 4), &SchemaType::Color));
        assert!(!matches_type(&call("rgba", 3), &SchemaType::Color));
        assert!(!matches_type(&call("darken", 2), &SchemaType::Color));
        assert!(!matches_type(
            &Literal::Keyword("nope".into()),
            &SchemaType::Color
        ));
    }

    #[test]
    fn test_matches_type_other_accepts_anything() {
        let other = SchemaType::Other("uri".into());
        assert!(matches_type(&Literal::Number(1.0), &other));
        assert!(matches_type(&Literal::List(vec![]), &other));
    }
}
