//! Row to gauge projection.
//!
//! Every configured metric is applied to every row of a query result, so a
//! result of R rows and M metrics yields exactly R×M data points. Any missing
//! column or unusable value aborts the whole batch.

use crate::config::{MetricSpec, ValueMode};
use crate::domain::errors::MappingError;
use crate::domain::types::{DataPoint, ResultRow, RowValue, parse_timestamp};
use std::collections::BTreeMap;

/// Column carrying the observation time of each row
pub const EVENT_TIME_COLUMN: &str = "EVENT_AT";

/// Projects result rows onto gauge data points.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricMapper {
    mode: ValueMode,
}

impl MetricMapper {
    pub fn new(mode: ValueMode) -> Self {
        Self { mode }
    }

    /// Metrics outer, rows inner: points for the first metric come first.
    pub fn map_rows(
        &self,
        rows: &[ResultRow],
        metrics: &[MetricSpec],
    ) -> Result<Vec<DataPoint>, MappingError> {
        let mut points = Vec::with_capacity(rows.len() * metrics.len());
        for metric in metrics {
            for row in rows {
                points.push(self.map_row(row, metric)?);
            }
        }
        Ok(points)
    }

    pub fn map_row(&self, row: &ResultRow, metric: &MetricSpec) -> Result<DataPoint, MappingError> {
        let value = self.extract_value(row, &metric.value_column)?;

        let mut dimensions = BTreeMap::new();
        for column in &metric.dimension_columns {
            dimensions.insert(column.clone(), column_value(row, column)?.clone());
        }

        Ok(DataPoint {
            metric: metric.metric_name.clone(),
            value,
            dimensions,
            timestamp: extract_timestamp_millis(row)?,
        })
    }

    fn extract_value(&self, row: &ResultRow, column: &str) -> Result<f64, MappingError> {
        let value = match (column_value(row, column)?, self.mode) {
            (RowValue::Text(text), mode) => {
                // text mode takes the cell exactly as stored
                let text_to_parse = match mode {
                    ValueMode::Numeric => text.trim(),
                    ValueMode::Text => text.as_str(),
                };
                text_to_parse
                    .parse::<f64>()
                    .map_err(|_| MappingError::NotNumeric {
                        column: column.to_string(),
                        value: text.clone(),
                    })?
            }
            (RowValue::Float(x), ValueMode::Numeric) => *x,
            (RowValue::Integer(i), ValueMode::Numeric) => *i as f64,
            (other, mode) => {
                return Err(MappingError::TypeMismatch {
                    column: column.to_string(),
                    expected: mode.expected(),
                    found: other.kind(),
                });
            }
        };

        // NaN and infinities have no JSON representation
        if !value.is_finite() {
            return Err(MappingError::NotNumeric {
                column: column.to_string(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }
}

fn column_value<'a>(row: &'a ResultRow, column: &str) -> Result<&'a RowValue, MappingError> {
    row.get(column).ok_or_else(|| MappingError::MissingColumn {
        column: column.to_string(),
    })
}

/// `EVENT_AT` is a native timestamp, or text in one of the layouts
/// `parse_timestamp` understands.
fn extract_timestamp_millis(row: &ResultRow) -> Result<i64, MappingError> {
    match column_value(row, EVENT_TIME_COLUMN)? {
        RowValue::Timestamp(ts) => Ok(ts.timestamp_millis()),
        RowValue::Text(text) => parse_timestamp(text)
            .map(|ts| ts.timestamp_millis())
            .ok_or_else(|| MappingError::NotTimestamp {
                column: EVENT_TIME_COLUMN.to_string(),
                value: text.clone(),
            }),
        other => Err(MappingError::TypeMismatch {
            column: EVENT_TIME_COLUMN.to_string(),
            expected: "timestamp",
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn metric(name: &str, value_column: &str, dimensions: &[&str]) -> MetricSpec {
        MetricSpec {
            metric_name: name.to_string(),
            value_column: value_column.to_string(),
            dimension_columns: dimensions.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn row(value: RowValue, region: &str, hour: u32) -> ResultRow {
        [
            ("VAL", value),
            ("REGION", RowValue::Text(region.to_string())),
            (
                EVENT_TIME_COLUMN,
                RowValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_single_row_scenario() {
        let mapper = MetricMapper::default();
        let rows = vec![row(RowValue::Float(10.5), "us-east", 0)];

        let points = mapper
            .map_rows(&rows, &[metric("cpu.load", "VAL", &["REGION"])])
            .unwrap();

        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.metric, "cpu.load");
        assert_eq!(point.value, 10.5);
        assert_eq!(
            point.dimensions.get("REGION"),
            Some(&RowValue::Text("us-east".to_string()))
        );
        assert_eq!(point.timestamp, 1704067200000);
    }

    #[test]
    fn test_cross_product_metrics_outer() {
        let mapper = MetricMapper::default();
        let rows = vec![
            row(RowValue::Text("1".to_string()), "a", 0),
            row(RowValue::Text("2".to_string()), "b", 1),
            row(RowValue::Text("3".to_string()), "c", 2),
        ];
        let metrics = vec![
            metric("first", "VAL", &[]),
            metric("second", "VAL", &["REGION"]),
        ];

        let points = mapper.map_rows(&rows, &metrics).unwrap();

        assert_eq!(points.len(), 6);
        let names: Vec<_> = points.iter().map(|p| p.metric.as_str()).collect();
        assert_eq!(
            names,
            vec!["first", "first", "first", "second", "second", "second"]
        );
        let values: Vec<_> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_dimensions_is_empty_map() {
        let mapper = MetricMapper::default();
        let rows = vec![row(RowValue::Integer(4), "a", 0)];

        let points = mapper.map_rows(&rows, &[metric("m", "VAL", &[])]).unwrap();

        assert!(points[0].dimensions.is_empty());
        let json = serde_json::to_value(&points[0]).unwrap();
        assert_eq!(json["dimensions"], serde_json::json!({}));
    }

    #[test]
    fn test_zero_rows_yield_zero_points() {
        let mapper = MetricMapper::default();
        let points = mapper.map_rows(&[], &[metric("m", "VAL", &[])]).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_non_numeric_text_is_rejected() {
        let mapper = MetricMapper::default();
        let rows = vec![row(RowValue::Text("abc".to_string()), "a", 0)];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &[])])
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::NotNumeric {
                column: "VAL".to_string(),
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_nan_text_is_rejected() {
        let mapper = MetricMapper::default();
        let rows = vec![row(RowValue::Text("NaN".to_string()), "a", 0)];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &[])])
            .unwrap_err();
        assert!(matches!(err, MappingError::NotNumeric { .. }));
    }

    #[test]
    fn test_text_mode_rejects_native_numbers() {
        let mapper = MetricMapper::new(ValueMode::Text);
        let rows = vec![row(RowValue::Float(10.5), "a", 0)];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &[])])
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::TypeMismatch {
                column: "VAL".to_string(),
                expected: "string",
                found: "float",
            }
        );
    }

    #[test]
    fn test_text_mode_parses_strings() {
        let mapper = MetricMapper::new(ValueMode::Text);
        let rows = vec![row(RowValue::Text("42.25".to_string()), "a", 0)];

        let points = mapper.map_rows(&rows, &[metric("m", "VAL", &[])]).unwrap();
        assert_eq!(points[0].value, 42.25);
    }

    #[test]
    fn test_text_mode_rejects_padded_strings() {
        let mapper = MetricMapper::new(ValueMode::Text);
        let rows = vec![row(RowValue::Text(" 42.25 ".to_string()), "a", 0)];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &[])])
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::NotNumeric {
                column: "VAL".to_string(),
                value: " 42.25 ".to_string(),
            }
        );
    }

    #[test]
    fn test_numeric_mode_tolerates_padding() {
        let mapper = MetricMapper::default();
        let rows = vec![row(RowValue::Text(" 42.25 ".to_string()), "a", 0)];

        let points = mapper.map_rows(&rows, &[metric("m", "VAL", &[])]).unwrap();
        assert_eq!(points[0].value, 42.25);
    }

    #[test]
    fn test_text_dimensions_are_copied_verbatim() {
        let mapper = MetricMapper::default();
        let rows: Vec<ResultRow> = vec![
            [
                ("VAL", RowValue::Float(1.0)),
                ("BUILD", RowValue::Text("2024-03-05 12:30:15".to_string())),
                ("TZ", RowValue::Text("2024-01-01T05:00:00+05:00".to_string())),
                (EVENT_TIME_COLUMN, RowValue::Text("2024-01-01T00:00:00Z".to_string())),
            ]
            .into_iter()
            .collect(),
        ];

        let points = mapper
            .map_rows(&rows, &[metric("m", "VAL", &["BUILD", "TZ"])])
            .unwrap();

        let json = serde_json::to_value(&points[0].dimensions).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "BUILD": "2024-03-05 12:30:15",
                "TZ": "2024-01-01T05:00:00+05:00"
            })
        );
    }

    #[test]
    fn test_event_at_text_is_parsed() {
        let mapper = MetricMapper::default();
        let rows: Vec<ResultRow> = vec![
            [
                ("VAL", RowValue::Float(10.5)),
                (EVENT_TIME_COLUMN, RowValue::Text("2024-01-01 00:00:00".to_string())),
            ]
            .into_iter()
            .collect(),
        ];

        let points = mapper.map_rows(&rows, &[metric("m", "VAL", &[])]).unwrap();
        assert_eq!(points[0].timestamp, 1704067200000);
    }

    #[test]
    fn test_missing_dimension_column() {
        let mapper = MetricMapper::default();
        let rows = vec![row(RowValue::Float(1.0), "a", 0)];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &["HOST"])])
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::MissingColumn {
                column: "HOST".to_string()
            }
        );
    }

    #[test]
    fn test_event_at_unparseable_text() {
        let mapper = MetricMapper::default();
        let rows: Vec<ResultRow> = vec![
            [
                ("VAL", RowValue::Float(1.0)),
                (EVENT_TIME_COLUMN, RowValue::Text("yesterday".to_string())),
            ]
            .into_iter()
            .collect(),
        ];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &[])])
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::NotTimestamp {
                column: EVENT_TIME_COLUMN.to_string(),
                value: "yesterday".to_string(),
            }
        );
    }

    #[test]
    fn test_event_at_must_be_time_like() {
        let mapper = MetricMapper::default();
        let rows: Vec<ResultRow> = vec![
            [
                ("VAL", RowValue::Float(1.0)),
                (EVENT_TIME_COLUMN, RowValue::Integer(1704067200)),
            ]
            .into_iter()
            .collect(),
        ];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &[])])
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::TypeMismatch {
                column: EVENT_TIME_COLUMN.to_string(),
                expected: "timestamp",
                found: "integer",
            }
        );
    }

    #[test]
    fn test_missing_event_at() {
        let mapper = MetricMapper::default();
        let rows: Vec<ResultRow> = vec![[("VAL", RowValue::Float(1.0))].into_iter().collect()];

        let err = mapper
            .map_rows(&rows, &[metric("m", "VAL", &[])])
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::MissingColumn {
                column: EVENT_TIME_COLUMN.to_string()
            }
        );
    }

    #[test]
    fn test_no_metrics_yield_no_points() {
        let mapper = MetricMapper::default();
        let rows = vec![row(RowValue::Float(1.0), "a", 0)];
        assert!(mapper.map_rows(&rows, &[]).unwrap().is_empty());
    }
}
