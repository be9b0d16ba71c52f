// Row to datapoint projection
pub mod mapper;

// Query/send orchestrator
pub mod relay;

pub use mapper::{EVENT_TIME_COLUMN, MetricMapper};
pub use relay::{ErrorPolicy, QueryFailure, Relay};
