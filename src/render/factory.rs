//! Renderer selection for torque layers.

use serde::Serialize;

use super::config::RenderConfig;
use super::error::DispatchError;
use super::formats::{renderer_for, RendererKind};
use crate::error::TorqueError;
use crate::mapconfig::MapConfig;
use crate::query::{DataSource, StepResolver};
use crate::style::{AttrKey, StyleExtractor};

/// Per-request renderer options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererOptions {
    /// Index of the layer to render.
    pub layer: Option<usize>,
}

impl RendererOptions {
    pub fn layer(index: usize) -> Self {
        Self { layer: Some(index) }
    }
}

/// Everything a renderer needs to serve one tile request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RendererPlan {
    pub kind: RendererKind,
    pub format: String,
    pub layer: usize,
    pub sql: String,
    pub config: RenderConfig,
}

/// Creates renderer plans for torque layers.
///
/// The factory holds no per-request state. One instance can serve
/// concurrent requests.
///
/// # Example
///
/// ```rust
/// use torque_config::mapconfig::{LayerConfig, LayerOptions, MapConfig};
/// use torque_config::query::{DataSource, DataSourceError, QueryResult};
/// use torque_config::render::{DispatchError, RendererOptions, TorqueFactory};
/// use torque_config::TorqueError;
///
/// struct Unused;
///
/// impl DataSource for Unused {
///     fn query(&self, _: &str, _: bool) -> Result<Option<QueryResult>, DataSourceError> {
///         unreachable!("dispatch errors are raised before any query")
///     }
/// }
///
/// let map = MapConfig::new(vec![LayerConfig::torque(LayerOptions::new("SELECT 1"))]);
/// let err = TorqueFactory::new()
///     .get_renderer(&map, "mvt", &RendererOptions::layer(0), &Unused)
///     .unwrap_err();
/// assert!(matches!(err, TorqueError::Dispatch(DispatchError::UnsupportedFormat { .. })));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TorqueFactory {
    extractor: StyleExtractor,
}

impl TorqueFactory {
    /// Renderer family name.
    pub const NAME: &'static str = "torque";

    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom extractor, for another grammar or schema.
    pub fn with_extractor(extractor: StyleExtractor) -> Self {
        Self { extractor }
    }

    pub fn supports_format(&self, format: &str) -> bool {
        renderer_for(format).is_some()
    }

    /// Validates the request, then extracts and resolves the layer.
    ///
    /// The request is checked in this order, with no query issued until all
    /// checks pass:
    ///
    /// 1. a layer is specified
    /// 2. the format is supported
    /// 3. the layer index is in range
    /// 4. the layer is a torque layer
    pub fn get_renderer(
        &self,
        map: &MapConfig,
        format: &str,
        options: &RendererOptions,
        source: &dyn DataSource,
    ) -> Result<RendererPlan, TorqueError> {
        let index = options.layer.ok_or(DispatchError::LayerNotSpecified)?;
        let kind = renderer_for(format).ok_or_else(|| DispatchError::UnsupportedFormat {
            format: format.to_string(),
        })?;
        let layer = map.layer(index).ok_or(DispatchError::LayerOutOfRange {
            index,
            count: map.layer_count(),
        })?;
        if !layer.is_torque() {
            return Err(DispatchError::NotTorqueLayer {
                index,
                kind: layer.kind.clone(),
            }
            .into());
        }

        let config = self.fetch_layer_attributes(
            source,
            &layer.options.sql,
            layer.options.cartocss.as_deref(),
        )?;
        log::debug!(
            "torque dispatch: layer {} served by {} renderer as {}",
            index,
            kind,
            format
        );
        Ok(RendererPlan {
            kind,
            format: format.to_string(),
            layer: index,
            sql: layer.options.sql.clone(),
            config,
        })
    }

    /// Extracts the style attributes of a layer and resolves its axis.
    ///
    /// Style errors are raised before the data source is queried.
    pub fn fetch_layer_attributes(
        &self,
        source: &dyn DataSource,
        sql: &str,
        cartocss: Option<&str>,
    ) -> Result<RenderConfig, TorqueError> {
        let attrs = self.extractor.extract(cartocss, &AttrKey::REQUIRED)?;
        let axis = StepResolver::new(source).resolve(sql, &attrs)?;
        Ok(RenderConfig::assemble(attrs, axis))
    }
}
