//! Step resolution errors.

use thiserror::Error;

use super::source::DataSourceError;
use crate::style::AttrKey;

/// Error returned when the temporal axis of a layer cannot be resolved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The data source rejected one of the probe queries.
    #[error("torque resolver: data source error: {0}")]
    DataSource(#[from] DataSourceError),

    /// A probe query returned no result set.
    #[error("torque resolver: {probe} query returned no result set")]
    EmptyResult { probe: &'static str },

    /// The animation column is not among the layer query's columns.
    #[error("torque resolver: column '{column}' does not exist in layer query")]
    MissingColumn { column: String },

    /// The attribute map lacks a key the resolver needs.
    #[error("torque resolver: missing attribute '{key}'")]
    MissingAttribute { key: AttrKey },

    /// An aggregate came back in a shape that is not a number.
    #[error("torque resolver: aggregate '{name}' is not numeric: {value}")]
    InvalidAggregate { name: &'static str, value: String },
}
