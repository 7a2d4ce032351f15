//! Backend adapters
//!
//! Each supported serving backend differs in endpoint path, request payload
//! shape, and how the generated text is pulled out of the response. Those
//! three concerns live behind the [`Backend`] enum so the executor and runner
//! never branch on backend identity.

use crate::dataset::Request;
use crate::error::Error;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Supported serving backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Vllm,
    Tgi,
    Triton,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vllm" => Ok(Self::Vllm),
            "tgi" => Ok(Self::Tgi),
            "triton" => Ok(Self::Triton),
            other => Err(Error::Config(format!(
                "unknown backend {other:?}, expected vllm, tgi, or triton"
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vllm => "vllm",
            Self::Tgi => "tgi",
            Self::Triton => "triton",
        })
    }
}

impl Backend {
    /// Generation endpoint for this backend. Triton scopes the path by model
    /// name; `model_name` is the tokenizer id with `-` mapped to `_`.
    pub fn api_url(&self, host: &str, port: u16, model_name: &str) -> String {
        match self {
            Self::Vllm | Self::Tgi => format!("http://{host}:{port}/generate"),
            Self::Triton => {
                format!("http://{host}:{port}/v2/models/{model_name}/generate")
            }
        }
    }

    /// Wire payload for one request. Decoding is forced greedy
    /// (temperature 0, top_p 1) where the backend supports it, so repeated
    /// runs produce comparable output lengths.
    pub fn payload(&self, request: &Request, best_of: u32) -> Value {
        match self {
            Self::Vllm | Self::Triton => json!({
                "prompt": request.prompt,
                "n": 1,
                "best_of": best_of,
                "temperature": 0.0,
                "top_p": 1.0,
                "max_tokens": request.output_len,
                "ignore_eos": true,
                "stream": false,
            }),
            Self::Tgi => json!({
                "inputs": request.prompt,
                "parameters": {
                    "best_of": best_of,
                    "max_new_tokens": request.output_len,
                    "do_sample": true,
                },
            }),
        }
    }

    /// Pull the generated text out of a parsed response.
    ///
    /// Triton may return `text` as an array of candidates; only the first is
    /// kept. All backends echo the prompt at the front of the text, so the
    /// generated part is the suffix after it.
    pub fn extract_generated(&self, response: &GenerateResponse, prompt: &str) -> String {
        let full = match &response.text {
            Some(TextField::One(text)) => text.as_str(),
            Some(TextField::Many(texts)) => texts.first().map(String::as_str).unwrap_or(""),
            None => "",
        };
        strip_prompt(full, prompt).to_string()
    }
}

/// Suffix of `full` after the echoed prompt.
fn strip_prompt<'a>(full: &'a str, prompt: &str) -> &'a str {
    if let Some(rest) = full.strip_prefix(prompt) {
        return rest;
    }
    // Echo differs from the prompt; fall back to slicing at the prompt's
    // byte length, keeping the full text if that is not a char boundary.
    full.get(prompt.len()..).unwrap_or(full)
}

/// Parsed generation response, shared across backends
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Present when the backend reports an application-level error
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub text: Option<TextField>,
}

impl GenerateResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The `text` field is a plain string for vLLM/TGI and may be an array of
/// candidate completions for Triton.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    One(String),
    Many(Vec<String>),
}
