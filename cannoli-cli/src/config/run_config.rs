//! Run config: canvas path, provider selection, API credentials, mock mode.
//! Filled from env / `.env`, then layered with CLI flag overrides in
//! `main.rs`.

use std::path::PathBuf;

/// Error type used for config loading and running.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Path to the canvas JSON file to compile and run.
    pub canvas_path: PathBuf,
    /// When true, run against `MockLlm`/mock ports instead of a live provider.
    pub mock: bool,
    /// Queued responses for `MockLlm`, consumed in order. Only used when `mock` is true.
    pub mock_responses: Vec<String>,
    /// OpenAI-compatible API base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    /// OpenAI-compatible API key.
    pub api_key: String,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature 0-2, lower is more deterministic. Default: unset (use API default).
    pub temperature: Option<f32>,
    /// When true, print a status line per object transition to stderr.
    pub verbose: bool,
}

impl CliConfig {
    /// Fill config from env vars (and `.env`). Requires `dotenv::dotenv().ok()`
    /// to have already run, same as the CLI binary's `main`.
    ///
    /// `OPENAI_API_KEY` is required unless `--mock` is passed; `OPENAI_API_BASE`,
    /// `OPENAI_MODEL` have defaults. `OPENAI_TEMPERATURE` is optional.
    pub fn from_env(canvas_path: PathBuf, mock: bool) -> Result<Self, Error> {
        let api_key = if mock {
            String::new()
        } else {
            std::env::var("OPENAI_API_KEY").map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "OPENAI_API_KEY is not set; please configure it in .env, or pass --mock",
                )
            })?
        };
        let api_base = std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let temperature = std::env::var("OPENAI_TEMPERATURE").ok().and_then(|s| s.parse().ok());

        Ok(Self {
            canvas_path,
            mock,
            mock_responses: Vec::new(),
            api_base,
            api_key,
            model,
            temperature,
            verbose: false,
        })
    }
}
