//! Native column decoding against real network warehouses.
//!
//! Run with:
//! GAUGE_RELAY_TEST_POSTGRES_URL=postgres://... GAUGE_RELAY_TEST_MYSQL_URL=mysql://... \
//!     cargo test --test warehouse_types_test -- --ignored

use chrono::{TimeZone, Utc};
use gauge_relay::application::MetricMapper;
use gauge_relay::config::MetricSpec;
use gauge_relay::domain::ports::QuerySource;
use gauge_relay::domain::types::{ResultRow, RowValue};
use gauge_relay::infrastructure::Database;

fn env_url(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: {} not set", name);
            None
        }
    }
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> RowValue {
    RowValue::Timestamp(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
}

fn cpu_load() -> MetricSpec {
    MetricSpec {
        metric_name: "cpu.load".to_string(),
        value_column: "VAL".to_string(),
        dimension_columns: vec!["REGION".to_string()],
    }
}

fn assert_scenario(rows: &[ResultRow]) {
    assert_eq!(rows[0].get("VAL"), Some(&RowValue::Float(10.5)));

    let points = MetricMapper::default().map_rows(rows, &[cpu_load()]).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].value, 10.5);
    assert_eq!(points[0].timestamp, 1704067200000);
    assert_eq!(
        points[0].dimensions.get("REGION"),
        Some(&RowValue::Text("us-east".to_string()))
    );
}

#[tokio::test]
#[ignore] // Ignored by default as it requires a running Postgres
async fn test_postgres_numeric_scenario() {
    let Some(url) = env_url("GAUGE_RELAY_TEST_POSTGRES_URL") else {
        return;
    };
    let mut db = Database::connect_url("postgres", &url).await.unwrap();

    let rows = db
        .fetch_rows(
            r#"SELECT 10.5 AS "VAL", 'us-east' AS "REGION", '2024-01-01T00:00:00Z' AS "EVENT_AT""#,
        )
        .await
        .unwrap();

    assert_scenario(&rows);
}

#[tokio::test]
#[ignore] // Ignored by default as it requires a running Postgres
async fn test_postgres_typed_columns() {
    let Some(url) = env_url("GAUGE_RELAY_TEST_POSTGRES_URL") else {
        return;
    };
    let mut db = Database::connect_url("postgres", &url).await.unwrap();

    let rows = db
        .fetch_rows(
            r#"SELECT CAST(1.25 AS NUMERIC(10,2)) AS "AMOUNT",
                      CAST(7 AS SMALLINT) AS "S",
                      CAST(8 AS BIGINT) AS "B",
                      CAST(2.5 AS REAL) AS "R",
                      true AS "OK",
                      TIMESTAMP '2024-01-01 00:00:00' AS "NAIVE",
                      TIMESTAMPTZ '2024-01-01 05:00:00+05' AS "ZONED",
                      DATE '2024-01-02' AS "DAY",
                      CAST(NULL AS TEXT) AS "NOTHING""#,
        )
        .await
        .unwrap();

    let row = &rows[0];
    assert_eq!(row.get("AMOUNT"), Some(&RowValue::Float(1.25)));
    assert_eq!(row.get("S"), Some(&RowValue::Integer(7)));
    assert_eq!(row.get("B"), Some(&RowValue::Integer(8)));
    assert_eq!(row.get("R"), Some(&RowValue::Float(2.5)));
    assert_eq!(row.get("OK"), Some(&RowValue::Bool(true)));
    assert_eq!(row.get("NAIVE"), Some(&utc(2024, 1, 1, 0, 0)));
    assert_eq!(row.get("ZONED"), Some(&utc(2024, 1, 1, 0, 0)));
    assert_eq!(row.get("DAY"), Some(&utc(2024, 1, 2, 0, 0)));
    assert_eq!(row.get("NOTHING"), Some(&RowValue::Null));
}

#[tokio::test]
#[ignore] // Ignored by default as it requires a running MySQL
async fn test_mysql_decimal_scenario() {
    let Some(url) = env_url("GAUGE_RELAY_TEST_MYSQL_URL") else {
        return;
    };
    let mut db = Database::connect_url("mysql", &url).await.unwrap();

    let rows = db
        .fetch_rows(
            "SELECT 10.5 AS VAL, 'us-east' AS REGION, \
             CAST('2024-01-01 00:00:00' AS DATETIME) AS EVENT_AT",
        )
        .await
        .unwrap();

    assert_eq!(rows[0].get("EVENT_AT"), Some(&utc(2024, 1, 1, 0, 0)));
    assert_scenario(&rows);
}

#[tokio::test]
#[ignore] // Ignored by default as it requires a running MySQL
async fn test_mysql_typed_columns() {
    let Some(url) = env_url("GAUGE_RELAY_TEST_MYSQL_URL") else {
        return;
    };
    let mut db = Database::connect_url("mysql", &url).await.unwrap();

    let rows = db
        .fetch_rows(
            "SELECT CAST(1.25 AS DECIMAL(10,2)) AS AMOUNT, \
             CAST(7 AS UNSIGNED) AS U, \
             CAST(-3 AS SIGNED) AS I, \
             CAST('2024-01-02' AS DATE) AS DAY",
        )
        .await
        .unwrap();

    let row = &rows[0];
    assert_eq!(row.get("AMOUNT"), Some(&RowValue::Float(1.25)));
    assert_eq!(row.get("U"), Some(&RowValue::Integer(7)));
    assert_eq!(row.get("I"), Some(&RowValue::Integer(-3)));
    assert_eq!(row.get("DAY"), Some(&utc(2024, 1, 2, 0, 0)));
}
