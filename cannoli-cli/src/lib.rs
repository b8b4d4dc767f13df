//! # cannoli-cli
//!
//! Reusable run logic for the Cannoli graph execution engine. Reads a canvas
//! JSON file plus config from env (or overrides), compiles it, and runs it
//! to completion with `cannoli-core`.
//!
//! ## Main modules
//!
//! - **Config**: [`CliConfig`] — build run configuration from env or
//!   programmatic overrides.
//! - **Run**: [`run_with_config`] — compile and execute the graph, returning
//!   a `Stoppage`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! use cannoli_cli::CliConfig;
//!
//! let config = CliConfig::from_env("flow.canvas".into(), false)?;
//! let (_graph, stoppage) = cannoli_cli::run_with_config(&config).await?;
//! println!("{:?}", stoppage.reason);
//! # Ok(()) }
//! ```
//!
//! ## Binary
//!
//! The `cannoli` binary parses CLI args into [`CliConfig`] and calls
//! [`run_with_config`]. Run: `cargo run -p cannoli-cli -- flow.canvas`.

mod config;
mod run;

pub use config::{CliConfig, Error};
pub use run::run_with_config;
