use crate::config::ConnectionParams;
use crate::domain::errors::{ConnectionError, QueryError};
use crate::domain::ports::QuerySource;
use crate::domain::types::ResultRow;
use crate::infrastructure::warehouse::connection::{Driver, build_connection_url, redacted};
use crate::infrastructure::warehouse::decode::{
    CellDecoder, decode_row, mysql_value, postgres_value, sqlite_value,
};
use async_trait::async_trait;
use futures_util::{Stream, TryStreamExt};
use sqlx::{Connection, MySqlConnection, PgConnection, Row, SqliteConnection};
use tracing::{debug, info};

/// Native sqlx connection, so each driver decodes its own column types
enum WarehouseConnection {
    Postgres(PgConnection),
    MySql(MySqlConnection),
    Sqlite(SqliteConnection),
}

/// Single warehouse connection held for the whole run
pub struct Database {
    conn: WarehouseConnection,
    driver: Driver,
}

impl Database {
    /// Connect using the receiver's driver name and connection parameters.
    pub async fn connect(driver: &str, params: &ConnectionParams) -> Result<Self, ConnectionError> {
        let url = build_connection_url(driver, params)?;
        Self::connect_url(driver, &url).await
    }

    pub async fn connect_url(driver: &str, url: &str) -> Result<Self, ConnectionError> {
        let driver = Driver::parse(driver)?;

        let conn = match driver {
            Driver::Postgres => PgConnection::connect(url)
                .await
                .map(WarehouseConnection::Postgres),
            Driver::MySql => MySqlConnection::connect(url)
                .await
                .map(WarehouseConnection::MySql),
            Driver::Sqlite => SqliteConnection::connect(url)
                .await
                .map(WarehouseConnection::Sqlite),
        }
        .map_err(|source| ConnectionError::Connect {
            driver: driver.scheme().to_string(),
            source,
        })?;

        info!("Connected to {} database: {}", driver.scheme(), redacted(url));
        Ok(Self { conn, driver })
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }
}

#[async_trait]
impl QuerySource for Database {
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
        let rows = match &mut self.conn {
            WarehouseConnection::Postgres(conn) => {
                collect_rows(sqlx::query(sql).fetch(conn), postgres_value).await?
            }
            WarehouseConnection::MySql(conn) => {
                collect_rows(sqlx::query(sql).fetch(conn), mysql_value).await?
            }
            WarehouseConnection::Sqlite(conn) => {
                collect_rows(sqlx::query(sql).fetch(conn), sqlite_value).await?
            }
        };

        debug!("Query returned {} rows", rows.len());
        Ok(rows)
    }
}

/// Drain the cursor in order, decoding each row as it arrives.
async fn collect_rows<R, S>(mut cursor: S, decode: CellDecoder<R>) -> Result<Vec<ResultRow>, QueryError>
where
    R: Row,
    S: Stream<Item = Result<R, sqlx::Error>> + Unpin,
{
    let mut rows = Vec::new();
    while let Some(row) = cursor.try_next().await.map_err(QueryError::Execute)? {
        rows.push(decode_row(&row, decode)?);
    }
    Ok(rows)
}
