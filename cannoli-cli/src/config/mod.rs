//! Configuration types for running a canvas from the command line.
//!
//! Re-exports [`CliConfig`] and config [`Error`].

mod run_config;

pub use run_config::{CliConfig, Error};
