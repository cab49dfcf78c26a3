//! # torque-config
//!
//! Rendering configuration for time-animated ("torque") map layers.
//!
//! A torque layer animates a dataset by bucketing rows into frames along one
//! column. Before a tile can be rendered, two things must be known:
//!
//! - the layer's torque attributes, declared in the `Map { ... }` block of
//!   its CartoCSS (frame count, resolution, aggregation function, time column)
//! - the temporal axis of the data: its bounds, row count and frame width
//!
//! ## Quick Start
//!
//! ```rust
//! use torque_config::mapconfig::{LayerConfig, LayerOptions, MapConfig};
//! use torque_config::query::{DataSource, DataSourceError, FieldType, QueryResult};
//! use torque_config::render::{RendererKind, RendererOptions, TorqueFactory};
//!
//! struct Events;
//!
//! impl DataSource for Events {
//!     fn query(&self, sql: &str, _readonly: bool) -> Result<Option<QueryResult>, DataSourceError> {
//!         if sql.ends_with("LIMIT 0") {
//!             return Ok(Some(QueryResult::new().field("ts", FieldType::Date)));
//!         }
//!         let row = serde_json::json!({"num_steps": 50, "min_date": 1000, "max_date": 1990});
//!         Ok(Some(QueryResult::new().row(row.as_object().unwrap().clone())))
//!     }
//! }
//!
//! let style = r#"
//!     Map {
//!         -torque-frame-count: 10;
//!         -torque-resolution: 2;
//!         -torque-aggregation-function: "count(cartodb_id)";
//!         -torque-time-attribute: "ts";
//!     }
//! "#;
//! let map = MapConfig::new(vec![LayerConfig::torque(
//!     LayerOptions::new("SELECT * FROM events").cartocss(style),
//! )]);
//!
//! let plan = TorqueFactory::new()
//!     .get_renderer(&map, "torque.json", &RendererOptions::layer(0), &Events)
//!     .unwrap();
//!
//! assert_eq!(plan.kind, RendererKind::Frames);
//! assert_eq!(plan.config.axis().step, 99.1);
//! assert!(plan.config.axis().is_time);
//! ```
//!
//! ## Modules
//!
//! - [`style`]: CartoCSS parsing, the reference schema and attribute extraction
//! - [`query`]: the [`DataSource`](query::DataSource) contract, SQL token
//!   substitution and temporal step resolution
//! - [`render`]: format table, configuration assembly and renderer dispatch
//! - [`mapconfig`]: map configuration documents (JSON or YAML)
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and installs no logger: queries
//! and resolved axes at `debug`, recoverable style parse errors at `warn`.

pub mod mapconfig;
pub mod query;
pub mod render;
pub mod style;

mod error;

pub use error::TorqueError;
pub use mapconfig::{LayerConfig, LayerOptions, MapConfig, MapConfigError};
pub use query::{DataSource, DataSourceError, QueryResult, StepResolver, TemporalAxis};
pub use render::{RenderConfig, RendererOptions, RendererPlan, TorqueFactory};
pub use style::{attrs_from_cartocss, AttrKey, AttributeMap, StyleExtractor};
