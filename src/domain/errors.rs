use thiserror::Error;

/// Errors raised while loading or validating the relay configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

/// Errors related to opening the warehouse connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("unsupported database driver '{driver}' (supported: {supported})")]
    UnsupportedDriver { driver: String, supported: String },

    #[error("invalid connection string: {reason}")]
    InvalidUrl { reason: String },

    #[error("failed to connect to {driver} database: {source}")]
    Connect {
        driver: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Errors raised while executing a query or reading its rows
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to execute query: {0}")]
    Execute(#[source] sqlx::Error),

    #[error("failed to decode column {column}: {source}")]
    Decode {
        column: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Errors raised while turning result rows into data points
#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("column {column} does not exist")]
    MissingColumn { column: String },

    #[error("column {column} value {value:?} is not numeric")]
    NotNumeric { column: String, value: String },

    #[error("column {column} value {value:?} is not a timestamp")]
    NotTimestamp { column: String, value: String },

    #[error("column {column} expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors raised while delivering a batch to the ingestion endpoint
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to serialize gauge batch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to send ingest request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to write batch: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure in one stage of a relay run
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl RelayError {
    /// Short stage name used in logs and the run summary
    pub fn stage(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "config",
            RelayError::Connection(_) => "connection",
            RelayError::Query(_) => "query",
            RelayError::Mapping(_) => "mapping",
            RelayError::Delivery(_) => "delivery",
        }
    }
}
