use thiserror::Error;

use crate::query::ResolveError;
use crate::render::DispatchError;
use crate::style::StyleError;

/// Any error on the request path of a torque layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TorqueError {
    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
