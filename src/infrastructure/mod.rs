pub mod ingest;
pub mod observability;
pub mod warehouse;

pub use ingest::{JsonWriterSink, SignalFxClient};
pub use warehouse::Database;
