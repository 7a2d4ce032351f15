//! Latency collection and summary statistics

use crate::error::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Timing record for a single completed request
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Prompt length in tokens
    pub prompt_len: usize,
    /// Target output length in tokens
    pub output_len: usize,
    /// End-to-end request latency, including retries
    pub latency: Duration,
}

/// Generated text for a single completed request, kept for audit output
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub prompt: String,
    #[serde(rename = "added")]
    pub generated_text: String,
}

/// Summary statistics over a full benchmark run
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkSummary {
    /// Completed requests per second of wall-clock time
    pub throughput: f64,
    /// Mean end-to-end latency in seconds
    pub mean_latency: f64,
    /// Mean of latency / (prompt_len + output_len), in seconds per token
    pub mean_latency_per_token: f64,
    /// Mean of latency / output_len, in seconds per output token
    pub mean_latency_per_output_token: f64,
}

/// Append-only store of completed observations.
///
/// Appends happen concurrently from many in-flight requests behind the
/// [`SharedCollector`] mutex; reads happen only after the runner has drained
/// every task.
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    observations: Vec<Observation>,
    outputs: Vec<OutputRecord>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed request. The observation and its output record
    /// are stored in the same call so the two sequences stay index-aligned.
    pub fn record(&mut self, observation: Observation, output: OutputRecord) {
        self.observations.push(observation);
        self.outputs.push(output);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn outputs(&self) -> &[OutputRecord] {
        &self.outputs
    }

    /// Consume the collector, keeping only the output records.
    pub fn into_outputs(self) -> Vec<OutputRecord> {
        self.outputs
    }

    /// Compute summary statistics over everything recorded so far.
    ///
    /// `wall_clock` is the duration of the whole run as measured by the
    /// driver. Errors with [`Error::EmptyResults`] instead of producing NaN
    /// when nothing was recorded.
    pub fn summarize(&self, wall_clock: Duration) -> Result<BenchmarkSummary> {
        if self.observations.is_empty() {
            return Err(Error::EmptyResults);
        }

        let n = self.observations.len() as f64;
        let mean_latency = self
            .observations
            .iter()
            .map(|o| o.latency.as_secs_f64())
            .sum::<f64>()
            / n;
        let mean_latency_per_token = self
            .observations
            .iter()
            .map(|o| o.latency.as_secs_f64() / (o.prompt_len + o.output_len) as f64)
            .sum::<f64>()
            / n;
        let mean_latency_per_output_token = self
            .observations
            .iter()
            .map(|o| o.latency.as_secs_f64() / o.output_len as f64)
            .sum::<f64>()
            / n;

        Ok(BenchmarkSummary {
            throughput: n / wall_clock.as_secs_f64(),
            mean_latency,
            mean_latency_per_token,
            mean_latency_per_output_token,
        })
    }
}

/// Type alias for the collector shared across request tasks
pub type SharedCollector = Arc<Mutex<ResultCollector>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(prompt_len: usize, output_len: usize, secs: f64) -> Observation {
        Observation {
            prompt_len,
            output_len,
            latency: Duration::from_secs_f64(secs),
        }
    }

    fn out(prompt: &str, generated: &str) -> OutputRecord {
        OutputRecord {
            prompt: prompt.to_string(),
            generated_text: generated.to_string(),
        }
    }

    #[test]
    fn test_record_keeps_sequences_aligned() {
        let mut collector = ResultCollector::new();
        assert!(collector.is_empty());

        collector.record(obs(10, 5, 1.0), out("a", "b"));
        collector.record(obs(20, 8, 2.0), out("c", "d"));

        assert_eq!(collector.len(), 2);
        assert_eq!(collector.observations().len(), collector.outputs().len());
        assert_eq!(collector.outputs()[1].prompt, "c");
    }

    #[test]
    fn test_summarize_single_observation() {
        let mut collector = ResultCollector::new();
        collector.record(obs(10, 5, 2.0), out("p", "g"));

        let summary = collector.summarize(Duration::from_secs(4)).unwrap();
        assert!((summary.throughput - 0.25).abs() < 1e-9);
        assert!((summary.mean_latency - 2.0).abs() < 1e-9);
        assert!((summary.mean_latency_per_token - 2.0 / 15.0).abs() < 1e-9);
        assert!((summary.mean_latency_per_output_token - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty_is_an_error() {
        let collector = ResultCollector::new();
        let err = collector.summarize(Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::EmptyResults));
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let collector: SharedCollector = Arc::new(Mutex::new(ResultCollector::new()));

        let mut tasks = vec![];
        for i in 0..50 {
            let collector = collector.clone();
            tasks.push(tokio::spawn(async move {
                collector
                    .lock()
                    .await
                    .record(obs(i + 1, i + 1, 0.1), out("p", "g"));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(collector.lock().await.len(), 50);
    }

    #[test]
    fn test_output_record_serializes_with_added_key() {
        let json = serde_json::to_string(&out("hi", " there!")).unwrap();
        assert_eq!(json, r#"{"prompt":"hi","added":" there!"}"#);
    }
}
