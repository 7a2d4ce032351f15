//! Benchmark orchestration
//!
//! The runner consumes the paced request sequence, fans each request out as
//! its own tokio task, drains every task once the schedule is exhausted, and
//! reduces the collected observations into a report.

use crate::arrival::{ArrivalRate, ArrivalScheduler};
use crate::dataset::Request;
use crate::error::Result;
use crate::executor::{RequestExecutor, Transport};
use crate::metrics::{BenchmarkSummary, OutputRecord, ResultCollector, SharedCollector};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Everything a finished run produces
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub summary: BenchmarkSummary,
    /// One record per completed request, in completion order
    pub outputs: Vec<OutputRecord>,
    pub total_time: Duration,
}

/// Runs a complete benchmark against one transport
pub struct BenchmarkRunner<T: Transport> {
    transport: Arc<T>,
    rate: ArrivalRate,
    seed: u64,
}

impl<T: Transport + 'static> BenchmarkRunner<T> {
    pub fn new(transport: T, rate: ArrivalRate, seed: u64) -> Self {
        Self {
            transport: Arc::new(transport),
            rate,
            seed,
        }
    }

    /// Run every request to completion and summarize.
    ///
    /// Requests are launched in input order at the scheduler's pace, never
    /// awaited individually, and fully drained before the wall clock stops.
    /// On success the report holds exactly one observation per input request;
    /// a panicking task surfaces as a join error rather than a short count.
    pub async fn run(&self, requests: Vec<Request>) -> Result<BenchmarkReport> {
        let collector: SharedCollector = Arc::new(Mutex::new(ResultCollector::new()));
        let executor = RequestExecutor::new(self.transport.clone(), collector.clone());
        let mut scheduler = ArrivalScheduler::new(self.rate, self.seed)?;

        let pb = ProgressBar::new(requests.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        tracing::info!(requests = requests.len(), rate = ?self.rate, "starting benchmark");

        let start = Instant::now();
        let mut tasks = Vec::with_capacity(requests.len());
        for request in requests {
            let executor = executor.clone();
            let pb = pb.clone();
            tasks.push(tokio::spawn(async move {
                executor.execute(request).await;
                pb.inc(1);
            }));
            // Idle until the next arrival; in-flight tasks keep running.
            scheduler.pace().await;
        }

        for task in tasks {
            task.await?;
        }
        let total_time = start.elapsed();
        pb.finish_with_message("benchmark complete");

        let collector = match Arc::try_unwrap(collector) {
            Ok(mutex) => mutex.into_inner(),
            // Unreachable after the drain above, but recover rather than panic.
            Err(arc) => arc.lock().await.clone(),
        };
        let summary = collector.summarize(total_time)?;

        tracing::info!(
            completed = collector.len(),
            total_time_s = total_time.as_secs_f64(),
            "benchmark finished"
        );

        Ok(BenchmarkReport {
            summary,
            outputs: collector.into_outputs(),
            total_time,
        })
    }
}
