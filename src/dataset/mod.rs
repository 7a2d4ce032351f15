//! Dataset loading and request sampling
//!
//! Reads a ShareGPT-style JSON dataset (a list of records carrying a
//! `conversations` array), pairs each first human turn with the following
//! assistant turn, token-length-filters the pairs, and samples the requested
//! number of benchmark requests.

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tokenizers::Tokenizer;

/// One prepared benchmark request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub prompt: String,
    /// Prompt length in tokens
    pub prompt_len: usize,
    /// Target number of generated tokens, taken from the reference completion
    pub output_len: usize,
}

#[derive(Debug, Deserialize)]
struct DatasetRecord {
    #[serde(default)]
    conversations: Vec<Turn>,
}

#[derive(Debug, Deserialize)]
struct Turn {
    value: String,
}

/// Load the dataset and sample `num_requests` token-length-filtered requests.
///
/// Filtering mirrors what serving benchmarks need in practice: prompts or
/// completions under 4 tokens are dropped (TGI rejects very short sequences),
/// as are prompts over 1024 tokens or pairs whose combined length exceeds
/// 2048. Sampling uses the caller's seeded RNG so runs are reproducible.
pub fn sample_requests<F>(
    path: &Path,
    num_requests: usize,
    count_tokens: F,
    rng: &mut StdRng,
) -> Result<Vec<Request>>
where
    F: Fn(&str) -> anyhow::Result<usize>,
{
    let raw = fs::read_to_string(path)?;
    let records: Vec<DatasetRecord> = serde_json::from_str(&raw)?;

    let mut filtered = Vec::new();
    for record in &records {
        // Need at least a (human, assistant) pair; extra turns are ignored.
        let [prompt_turn, completion_turn, ..] = record.conversations.as_slice() else {
            continue;
        };
        let prompt_len = count_tokens(&prompt_turn.value)
            .map_err(|e| Error::Dataset(format!("tokenization failed: {e}")))?;
        let output_len = count_tokens(&completion_turn.value)
            .map_err(|e| Error::Dataset(format!("tokenization failed: {e}")))?;

        if prompt_len < 4 || output_len < 4 {
            continue;
        }
        if prompt_len > 1024 || prompt_len + output_len > 2048 {
            continue;
        }
        filtered.push(Request {
            prompt: prompt_turn.value.clone(),
            prompt_len,
            output_len,
        });
    }

    if filtered.len() < num_requests {
        return Err(Error::Dataset(format!(
            "dataset has only {} usable requests after filtering, {} requested",
            filtered.len(),
            num_requests
        )));
    }

    Ok(filtered.into_iter().choose_multiple(rng, num_requests))
}

/// Load a tokenizer from a local `tokenizer.json` path or a hub identifier.
pub fn load_tokenizer(identifier: &str) -> Result<Tokenizer> {
    let result = if Path::new(identifier).exists() {
        Tokenizer::from_file(identifier)
    } else {
        Tokenizer::from_pretrained(identifier, None)
    };
    result.map_err(|e| Error::Config(format!("failed to load tokenizer {identifier:?}: {e}")))
}

/// Token-counting closure over a loaded tokenizer, as the sampler consumes it.
pub fn token_counter(tokenizer: Tokenizer) -> impl Fn(&str) -> anyhow::Result<usize> {
    move |text: &str| {
        let encoding = tokenizer
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("failed to encode text: {e}"))?;
        Ok(encoding.get_ids().len())
    }
}
