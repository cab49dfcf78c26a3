//! Style sheet parsing and torque attribute extraction.
//!
//! This module provides:
//!
//! - [`StyleParser`] / [`CartoParser`]: style text to rule blocks
//! - [`ReferenceSchema`] / [`TorqueReference`]: expected property types
//! - [`StyleExtractor`]: validated [`AttributeMap`] from a layer's style
//! - [`StyleError`]: errors from extraction

mod attrs;
mod error;
mod extract;
mod parser;
mod reference;
mod value;

pub use attrs::{AttrKey, AttrValue, AttributeMap};
pub use error::StyleError;
pub use extract::{attrs_from_cartocss, matches_type, StyleExtractor, ENUM_FALLBACK};
pub use parser::{
    CartoParser, Declaration, ParsedStyle, RuleBlock, StyleParseError, StyleParser, MAP_SELECTOR,
    MAX_NESTING,
};
pub use reference::{ReferenceSchema, SchemaType, TorqueReference};
pub use value::{Literal, Rgba};
