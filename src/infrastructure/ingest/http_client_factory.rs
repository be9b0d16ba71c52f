use crate::domain::errors::DeliveryError;
use reqwest::Client;
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the ingest HTTP client.
    ///
    /// Requests are sent once; a failed delivery is reported to the caller,
    /// never retried here. Without a configured timeout the reqwest default
    /// (none) applies.
    pub fn create_client(timeout: Option<Duration>) -> Result<Client, DeliveryError> {
        let mut builder = Client::builder()
            .user_agent(concat!("gauge-relay/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(1);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(DeliveryError::Client)
    }
}
