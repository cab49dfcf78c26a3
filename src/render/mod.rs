//! Renderer dispatch and configuration assembly.
//!
//! [`TorqueFactory`] validates a tile request against the map configuration,
//! then runs style extraction and step resolution for the requested layer
//! and hands back a [`RendererPlan`] carrying the assembled [`RenderConfig`].

mod config;
mod error;
mod factory;
mod formats;

pub use config::RenderConfig;
pub use error::DispatchError;
pub use factory::{RendererOptions, RendererPlan, TorqueFactory};
pub use formats::{renderer_for, supported_formats, RendererKind, FORMATS};
