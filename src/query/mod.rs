//! Data source access and temporal axis resolution.
//!
//! This module provides:
//!
//! - [`DataSource`]: the SQL execution contract the resolver consumes
//! - [`replace_tokens`]: pure placeholder substitution for layer SQL
//! - [`StepResolver`]: the two-probe derivation of a [`TemporalAxis`]
//! - [`ResolveError`]: errors from resolution

mod error;
mod resolve;
mod source;
mod tokens;

pub use error::ResolveError;
pub use resolve::{
    aggregate_sql, compute_step, probe_sql, quote_ident, LayerMetadata, StepResolver,
    TemporalAxis,
};
pub use source::{DataSource, DataSourceError, Field, FieldType, QueryResult, Row};
pub use tokens::{has_tokens, neutral_values, replace_tokens, tokens_in, TOKENS};
