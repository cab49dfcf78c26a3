//! Dispatch errors.

use thiserror::Error;

use super::formats::supported_formats;

/// Error raised while choosing a renderer for a request.
///
/// Every variant is detected from the request alone, before the data source
/// is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The requested tile format has no renderer.
    #[error(
        "torque dispatch: unsupported format '{format}', expected one of: {}",
        supported_formats().join(", ")
    )]
    UnsupportedFormat { format: String },

    /// The request named no layer.
    #[error("torque dispatch: layer not specified")]
    LayerNotSpecified,

    /// The layer index is past the end of the map's layers.
    #[error("torque dispatch: layer {index} out of range, map has {count} layers")]
    LayerOutOfRange { index: usize, count: usize },

    /// The layer exists but is not a torque layer.
    #[error("torque dispatch: layer {index} is of type '{kind}', expected 'torque'")]
    NotTorqueLayer { index: usize, kind: String },
}
