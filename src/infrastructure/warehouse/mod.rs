//! Warehouse access through sqlx, one native connection per run.

pub mod connection;
pub mod database;
mod decode;

pub use connection::{Driver, SUPPORTED_DRIVERS, build_connection_url};
pub use database::Database;
