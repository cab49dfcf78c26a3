//! Temporal step resolution.
//!
//! The resolver derives the animation axis of a torque layer with two
//! dependent queries:
//!
//! 1. **Schema probe**: `SELECT * FROM (<layer sql>) ... LIMIT 0` to learn the
//!    type of the animation column, and whether it exists at all
//! 2. **Aggregate probe**: row count plus min/max of the column over the
//!    whole layer, with epoch conversion for date columns
//!
//! The second query's text depends on the first's answer, so they always
//! run in sequence.

use serde::Serialize;
use serde_json::Value;

use super::error::ResolveError;
use super::source::{DataSource, Row};
use super::tokens::{neutral_values, replace_tokens};
use crate::style::{AttrKey, AttributeMap};

/// Alias of the subquery wrapping the layer SQL.
const WRAP_ALIAS: &str = "__torque_wrap_sql";

/// The animation axis of a torque layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemporalAxis {
    /// Lowest column value (epoch seconds for date columns).
    pub start: f64,
    /// Highest column value (epoch seconds for date columns).
    pub end: f64,
    /// Width of one frame, always positive and finite.
    pub step: f64,
    /// Row count of the layer.
    pub data_steps: u64,
    /// Whether the column is a date or timestamp.
    pub is_time: bool,
}

/// Axis summary as exposed to map clients, with bounds in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerMetadata {
    pub start: f64,
    pub end: f64,
    pub data_steps: u64,
    pub column_type: &'static str,
}

impl TemporalAxis {
    /// Summarizes the axis for layer metadata.
    pub fn metadata(&self) -> LayerMetadata {
        LayerMetadata {
            start: self.start * 1000.0,
            end: self.end * 1000.0,
            data_steps: self.data_steps,
            column_type: if self.is_time { "date" } else { "number" },
        }
    }
}

/// Computes the frame width.
///
/// The divisor is the smaller of the requested frame count and the row
/// count. A division by zero or an otherwise non-positive width falls back
/// to `1`, so the axis always advances.
///
/// # Example
///
/// ```rust
/// use torque_config::query::compute_step;
///
/// assert_eq!(compute_step(10.0, 100, 0.0, 99.0), 10.0);
/// assert_eq!(compute_step(10.0, 0, 0.0, 0.0), 1.0);
/// ```
pub fn compute_step(steps: f64, num_steps: u64, min: f64, max: f64) -> f64 {
    let divisor = steps.min(num_steps as f64);
    let step = (max - min + 1.0) / divisor;
    let step = if step.is_infinite() { 0.0 } else { step };
    if step > 0.0 {
        step
    } else {
        1.0
    }
}

/// Quotes a column name as a SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds the zero-row query used to read column metadata.
pub fn probe_sql(layer_sql: &str) -> String {
    format!("SELECT * FROM ({}) {} LIMIT 0", layer_sql, WRAP_ALIAS)
}

/// Builds the count/min/max query over the layer.
pub fn aggregate_sql(layer_sql: &str, column: &str, is_time: bool) -> String {
    let column = if is_time {
        format!("date_part('epoch', {})", quote_ident(column))
    } else {
        quote_ident(column)
    };
    format!(
        "SELECT count(*) AS num_steps, MAX({col}) AS max_date, MIN({col}) AS min_date FROM ({sql}) {alias}",
        col = column,
        sql = layer_sql,
        alias = WRAP_ALIAS
    )
}

/// Resolves the temporal axis of a layer against a data source.
///
/// # Example
///
/// ```rust
/// use torque_config::query::{DataSource, DataSourceError, FieldType, QueryResult, StepResolver};
/// use torque_config::style::{AttrKey, AttrValue, AttributeMap};
///
/// struct Events;
///
/// impl DataSource for Events {
///     fn query(&self, sql: &str, _readonly: bool) -> Result<Option<QueryResult>, DataSourceError> {
///         if sql.ends_with("LIMIT 0") {
///             return Ok(Some(QueryResult::new().field("n", FieldType::Number)));
///         }
///         let row = serde_json::json!({"num_steps": 100, "min_date": 0, "max_date": 99});
///         Ok(Some(QueryResult::new().row(row.as_object().unwrap().clone())))
///     }
/// }
///
/// let attrs = AttributeMap::new()
///     .with(AttrKey::Column, AttrValue::Text("n".into()))
///     .with(AttrKey::Steps, AttrValue::Number(10.0));
/// let axis = StepResolver::new(&Events).resolve("SELECT n FROM t", &attrs).unwrap();
/// assert_eq!(axis.step, 10.0);
/// assert!(!axis.is_time);
/// ```
pub struct StepResolver<'a> {
    source: &'a dyn DataSource,
}

impl<'a> StepResolver<'a> {
    pub fn new(source: &'a dyn DataSource) -> Self {
        Self { source }
    }

    /// Runs both probes and computes the axis.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::MissingAttribute`] if `attrs` lacks `column` or `steps`
    /// - [`ResolveError::DataSource`] if either query fails
    /// - [`ResolveError::EmptyResult`] if a probe yields no result set
    /// - [`ResolveError::MissingColumn`] if the column is not selected by the layer;
    ///   the aggregate query is not issued in that case
    /// - [`ResolveError::InvalidAggregate`] if an aggregate is not numeric
    pub fn resolve(
        &self,
        layer_sql: &str,
        attrs: &AttributeMap,
    ) -> Result<TemporalAxis, ResolveError> {
        let column = attrs.column().ok_or(ResolveError::MissingAttribute {
            key: AttrKey::Column,
        })?;
        let steps = attrs.steps().ok_or(ResolveError::MissingAttribute {
            key: AttrKey::Steps,
        })?;

        let sql = replace_tokens(layer_sql, &neutral_values());

        let probe = probe_sql(&sql);
        log::debug!("torque resolver: schema probe: {}", probe);
        let schema = self
            .source
            .query(&probe, true)?
            .ok_or(ResolveError::EmptyResult { probe: "schema" })?;
        let field = schema
            .fields
            .get(column)
            .ok_or_else(|| ResolveError::MissingColumn {
                column: column.to_string(),
            })?;
        let is_time = field.kind.is_time();

        let aggregate = aggregate_sql(&sql, column, is_time);
        log::debug!("torque resolver: aggregate probe: {}", aggregate);
        let result = self
            .source
            .query(&aggregate, true)?
            .ok_or(ResolveError::EmptyResult { probe: "aggregate" })?;
        let row = result
            .rows
            .first()
            .ok_or(ResolveError::EmptyResult { probe: "aggregate" })?;

        let data_steps = truncate_count(aggregate_value(row, "num_steps")?);
        let end = aggregate_value(row, "max_date")?;
        let start = aggregate_value(row, "min_date")?;
        let step = compute_step(steps, data_steps, start, end);

        let axis = TemporalAxis {
            start,
            end,
            step,
            data_steps,
            is_time,
        };
        log::debug!("torque resolver: resolved axis {:?}", axis);
        Ok(axis)
    }
}

/// Reads a numeric aggregate. Counts and numerics may come back as strings;
/// a null bound (empty layer) reads as zero.
fn aggregate_value(row: &Row, name: &'static str) -> Result<f64, ResolveError> {
    let invalid = |value: &Value| ResolveError::InvalidAggregate {
        name,
        value: value.to_string(),
    };
    match row.get(name) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| invalid(value)),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid(value)),
            _ => Err(invalid(value)),
        },
    }
}

fn truncate_count(count: f64) -> u64 {
    if count.is_finite() && count > 0.0 {
        count.trunc() as u64
    } else {
        0
    }
}
