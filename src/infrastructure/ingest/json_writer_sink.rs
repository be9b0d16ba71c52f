use crate::domain::errors::DeliveryError;
use crate::domain::ports::{DataPointSink, DeliveryReceipt};
use crate::domain::types::GaugeBatch;
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Mutex;

/// Sink for dry runs: writes each batch as the JSON body that would be posted.
pub struct JsonWriterSink<W: Write + Send> {
    out: Mutex<W>,
}

impl JsonWriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonWriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> DataPointSink for JsonWriterSink<W> {
    async fn send(&self, batch: &GaugeBatch) -> Result<DeliveryReceipt, DeliveryError> {
        let json = serde_json::to_string(batch)?;

        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("output writer lock poisoned"))?;
        writeln!(out, "{}", json)?;
        out.flush()?;

        Ok(DeliveryReceipt {
            status: None,
            status_line: format!("dry run: {} datapoints written", batch.len()),
        })
    }
}
