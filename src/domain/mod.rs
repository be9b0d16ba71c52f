// Domain-specific error types
pub mod errors;

// Port interfaces
pub mod ports;

// Row values, datapoints and run outcomes
pub mod types;
