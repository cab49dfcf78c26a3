//! Style extraction errors.

use thiserror::Error;

use super::attrs::AttrKey;
use super::parser::StyleParseError;
use super::reference::SchemaType;

/// Error returned when a layer's style cannot provide torque attributes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    /// The layer has no style text at all.
    #[error("torque style: missing cartocss for layer")]
    MissingStyle,

    /// A required property is not declared in any `Map` block.
    #[error("torque style: missing required property '{}' ({key}) in Map block", .key.property())]
    MissingProperty { key: AttrKey },

    /// A property value has the wrong type for the reference schema.
    #[error(
        "torque style: unexpected type for property '{property}', expected {expected}, found {found}"
    )]
    TypeMismatch {
        property: String,
        expected: SchemaType,
        /// Kind of the declared literal, see [`Literal::kind`](super::Literal::kind).
        found: &'static str,
    },

    /// The parser reported errors and no `Map` block could be located.
    #[error("torque style: no Map block found, parse errors: {}", join_errors(.errors))]
    Syntax { errors: Vec<StyleParseError> },
}

fn join_errors(errors: &[StyleParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_property_names_key_and_property() {
        let msg = StyleError::MissingProperty {
            key: AttrKey::Column,
        }
        .to_string();
        assert!(msg.starts_with("torque style:"));
        assert!(msg.contains("-torque-time-attribute"));
        assert!(msg.contains("(column)"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let msg = StyleError::TypeMismatch {
            property: "-torque-frame-count".into(),
            expected: SchemaType::Number,
            found: "string",
        }
        .to_string();
        assert_eq!(
            msg,
            "torque style: unexpected type for property '-torque-frame-count', expected number, found string"
        );
    }

    #[test]
    fn test_syntax_lists_errors() {
        let msg = StyleError::Syntax {
            errors: vec![StyleParseError {
                line: 2,
                column: 3,
                message: "unexpected '}'".into(),
            }],
        }
        .to_string();
        assert!(msg.contains("2:3: unexpected '}'"));
    }
}
