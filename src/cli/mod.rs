//! CLI argument parsing and command handling

use crate::arrival::ArrivalRate;
use crate::backend::Backend;
use crate::dataset::{load_tokenizer, sample_requests, token_counter};
use crate::executor::HttpTransport;
use crate::output::JsonlWriter;
use crate::runner::{BenchmarkReport, BenchmarkRunner};
use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Benchmark the online serving throughput of a text-generation backend
#[derive(Parser, Debug)]
#[command(name = "serving-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend to benchmark (vllm, tgi, triton)
    #[arg(long, default_value = "vllm")]
    pub backend: String,

    /// Target host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Target port
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Path to the ShareGPT-style dataset
    #[arg(long)]
    pub dataset: PathBuf,

    /// Name or path of the tokenizer
    #[arg(long)]
    pub tokenizer: String,

    /// Generate `best_of` sequences per prompt and return the best one
    #[arg(long, default_value = "1")]
    pub best_of: u32,

    /// Number of prompts to process
    #[arg(long, default_value = "1000")]
    pub num_prompts: usize,

    /// Requests per second. "inf" sends every request at time zero;
    /// otherwise arrival times follow a Poisson process at this rate.
    #[arg(long, default_value_t = f64::INFINITY)]
    pub request_rate: f64,

    /// Seed for dataset sampling and arrival pacing
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Accepted for parity with other harnesses; tokenizer loading here
    /// never executes remote code
    #[arg(long)]
    pub trust_remote_code: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Run the benchmark based on CLI arguments
    pub async fn run(&self) -> Result<()> {
        let backend: Backend = self.backend.parse()?;
        let rate = ArrivalRate::from_rps(self.request_rate)?;
        let model_name = self.tokenizer.replace('-', "_");
        let api_url = backend.api_url(&self.host, self.port, &model_name);

        tracing::info!(%backend, %api_url, num_prompts = self.num_prompts, "configured");

        let tokenizer = load_tokenizer(&self.tokenizer)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let requests = sample_requests(
            &self.dataset,
            self.num_prompts,
            token_counter(tokenizer),
            &mut rng,
        )
        .with_context(|| format!("failed to sample requests from {}", self.dataset.display()))?;

        tracing::info!(sampled = requests.len(), "dataset ready");

        let transport = HttpTransport::new(backend, api_url, self.best_of)?;
        let runner = BenchmarkRunner::new(transport, rate, self.seed);
        let report = runner.run(requests).await?;

        self.print_results(&report);

        let output_path = format!("outputs-{backend}.jsonl");
        JsonlWriter::export(&report.outputs, Path::new(&output_path))
            .with_context(|| format!("failed to write {output_path}"))?;
        tracing::info!(path = %output_path, records = report.outputs.len(), "outputs written");

        Ok(())
    }

    fn print_results(&self, report: &BenchmarkReport) {
        let s = &report.summary;
        println!("Total time: {:.2} s", report.total_time.as_secs_f64());
        println!("Throughput: {:.2} requests/s", s.throughput);
        println!("Average latency: {:.2} s", s.mean_latency);
        println!("Average latency per token: {:.2} s", s.mean_latency_per_token);
        println!(
            "Average latency per output token: {:.2} s",
            s.mean_latency_per_output_token
        );
    }
}
