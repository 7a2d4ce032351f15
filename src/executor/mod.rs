//! Per-request execution
//!
//! The executor owns the lifetime of one request: it times the wire exchange,
//! retries on any failure, and records exactly one observation once the
//! backend answers cleanly.

use crate::backend::{Backend, GenerateResponse};
use crate::dataset::Request;
use crate::metrics::{Observation, OutputRecord, SharedCollector};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One attempt at the wire exchange with the target service.
///
/// `Ok` carries the generated text. Transport-level failures and
/// backend-reported application errors both come back as `Err`; the executor
/// treats them identically.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(&self, request: &Request) -> anyhow::Result<String>;
}

/// Transport posting to a real backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    backend: Backend,
    api_url: String,
    best_of: u32,
}

impl HttpTransport {
    /// The total timeout is deliberately enormous; a benchmark request is
    /// never abandoned short of the transport's own 3-hour ceiling.
    pub fn new(backend: Backend, api_url: String, best_of: u32) -> crate::error::Result<Self> {
        let client = Client::builder()
            .user_agent("Benchmark Client")
            .timeout(Duration::from_secs(3 * 3600))
            .build()?;
        Ok(Self {
            client,
            backend,
            api_url,
            best_of,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn generate(&self, request: &Request) -> anyhow::Result<String> {
        let payload = self.backend.payload(request, self.best_of);
        let response = self
            .client
            .post(&self.api_url)
            .json(&payload)
            .send()
            .await
            .context("failed to send request")?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("failed to read response body")?;

        if parsed.is_error() {
            anyhow::bail!("backend reported an error: {:?}", parsed.error);
        }
        Ok(self.backend.extract_generated(&parsed, &request.prompt))
    }
}

/// Executes single requests against a transport and feeds the shared
/// collector. Cheap to clone into spawned tasks.
pub struct RequestExecutor<T: Transport> {
    transport: Arc<T>,
    collector: SharedCollector,
}

impl<T: Transport> Clone for RequestExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            collector: self.collector.clone(),
        }
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: Arc<T>, collector: SharedCollector) -> Self {
        Self {
            transport,
            collector,
        }
    }

    /// Run one request to completion.
    ///
    /// Retries without bound or backoff on every failure; the measured
    /// latency spans all attempts. Exactly one observation is recorded, and
    /// the observation and output record land under a single lock
    /// acquisition so the two sequences stay aligned.
    pub async fn execute(&self, request: Request) {
        let start = Instant::now();
        let mut attempt: u32 = 0;
        let generated = loop {
            attempt += 1;
            match self.transport.generate(&request).await {
                Ok(text) => break text,
                Err(error) => {
                    tracing::debug!(attempt, %error, "request attempt failed, retrying");
                }
            }
        };
        let latency = start.elapsed();

        let observation = Observation {
            prompt_len: request.prompt_len,
            output_len: request.output_len,
            latency,
        };
        let output = OutputRecord {
            prompt: request.prompt,
            generated_text: generated,
        };
        self.collector.lock().await.record(observation, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ResultCollector;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    fn request(prompt: &str) -> Request {
        Request {
            prompt: prompt.to_string(),
            prompt_len: 2,
            output_len: 3,
        }
    }

    fn collector() -> SharedCollector {
        Arc::new(Mutex::new(ResultCollector::new()))
    }

    /// Fails a fixed number of times before answering.
    struct FlakyTransport {
        failures: u32,
        attempts: AtomicU32,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn generate(&self, request: &Request) -> anyhow::Result<String> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                anyhow::bail!("transient failure on attempt {attempt}");
            }
            Ok(format!("{} there!", request.prompt))
        }
    }

    #[tokio::test]
    async fn test_success_records_one_observation() {
        let transport = Arc::new(FlakyTransport {
            failures: 0,
            attempts: AtomicU32::new(0),
        });
        let collector = collector();
        let executor = RequestExecutor::new(transport, collector.clone());

        executor.execute(request("hi")).await;

        let store = collector.lock().await;
        assert_eq!(store.len(), 1);
        let obs = &store.observations()[0];
        assert_eq!(obs.prompt_len, 2);
        assert_eq!(obs.output_len, 3);
        assert!(obs.latency > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_retry_does_not_duplicate_observations() {
        let transport = Arc::new(FlakyTransport {
            failures: 2,
            attempts: AtomicU32::new(0),
        });
        let collector = collector();
        let executor = RequestExecutor::new(transport.clone(), collector.clone());

        executor.execute(request("hi")).await;

        assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
        let store = collector.lock().await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.outputs()[0].generated_text, "hi there!");
    }
}
