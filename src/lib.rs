//! serving-bench - Online serving throughput benchmark
//!
//! This library measures the serving throughput and per-request latency of a
//! text-generation HTTP service. Prompts come from a ShareGPT-style dataset,
//! arrive at the target according to a configurable process (burst or
//! Poisson), and every completion latency is folded into summary statistics.
//!
//! # Architecture
//!
//! - **Dataset**: loading, token-length filtering, and seeded sampling
//! - **Arrival**: request pacing (burst or exponential inter-arrival gaps)
//! - **Backend**: payload shaping and text extraction per serving backend
//! - **Executor**: one timed wire exchange per request, retried until success
//! - **Runner**: fan-out of concurrent requests, drain, and reporting
//! - **Metrics**: shared result collection and summary statistics
//!
//! # Example
//!
//! ```rust,no_run
//! use serving_bench::arrival::ArrivalRate;
//! use serving_bench::backend::Backend;
//! use serving_bench::executor::HttpTransport;
//! use serving_bench::runner::BenchmarkRunner;
//!
//! #[tokio::main]
//! async fn main() -> serving_bench::Result<()> {
//!     let backend = Backend::Vllm;
//!     let url = backend.api_url("localhost", 8000, "llama_7b");
//!     let transport = HttpTransport::new(backend, url, 1)?;
//!     let runner = BenchmarkRunner::new(transport, ArrivalRate::Burst, 0);
//!     // let report = runner.run(requests).await?;
//!     Ok(())
//! }
//! ```

pub mod arrival;
pub mod backend;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod output;
pub mod runner;

// Re-export commonly used types
pub use arrival::{ArrivalRate, ArrivalScheduler};
pub use backend::Backend;
pub use dataset::Request;
pub use error::{Error, Result};
pub use executor::{HttpTransport, RequestExecutor, Transport};
pub use metrics::{BenchmarkSummary, Observation, OutputRecord, ResultCollector};
pub use runner::{BenchmarkReport, BenchmarkRunner};
