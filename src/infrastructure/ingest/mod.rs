pub mod client;
pub mod http_client_factory;
pub mod json_writer_sink;

pub use client::SignalFxClient;
pub use http_client_factory::HttpClientFactory;
pub use json_writer_sink::JsonWriterSink;
