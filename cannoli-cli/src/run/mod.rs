//! Run entry point: compile a canvas file and drive it to completion.
//!
//! Re-exports [`run_with_config`] and [`Error`].

use std::sync::Arc;

use cannoli_core::factory::{self, FactoryConfig};
use cannoli_core::llm::{LlmProvider, MockLlm};
use cannoli_core::message::Message;
use cannoli_core::object::CannoliGraph;
use cannoli_core::ports::Ports;
use cannoli_core::scheduler::{self, Stoppage};

use crate::config::CliConfig;

pub use crate::config::Error;

fn build_llm(config: &CliConfig) -> Arc<dyn LlmProvider> {
    if config.mock {
        let mut llm = MockLlm::new();
        for response in &config.mock_responses {
            llm = llm.with_response(Message::assistant(response.clone()));
        }
        return Arc::new(llm);
    }

    #[cfg(feature = "openai")]
    {
        use cannoli_core::llm::ChatOpenAi;
        let mut llm = ChatOpenAi::new(config.model.clone()).with_base_url(config.api_base.clone()).with_api_key(config.api_key.clone());
        if let Some(temperature) = config.temperature {
            llm = llm.with_temperature(temperature);
        }
        Arc::new(llm)
    }
    #[cfg(not(feature = "openai"))]
    {
        panic!("cannoli-cli built without the `openai` feature and --mock was not passed");
    }
}

/// Compiles the canvas named by `config.canvas_path` and runs it to
/// completion, returning the hydrated graph (for inspecting final node
/// buffers) alongside the terminal `Stoppage`.
pub async fn run_with_config(config: &CliConfig) -> Result<(Arc<CannoliGraph>, Stoppage), Error> {
    let raw = std::fs::read_to_string(&config.canvas_path)?;
    let canvas: cannoli_core::canvas::CanvasData = serde_json::from_str(&raw)?;

    let verified = factory::compile(&canvas, &FactoryConfig::default())?;
    let graph = Arc::new(factory::hydrate(verified));

    let ports = if config.mock { Ports::mock() } else { Ports { fetcher: Arc::new(cannoli_core::ports::HttpFetcher::new()), ..Ports::mock() } };
    let llm = build_llm(config);

    let stoppage = scheduler::run(Arc::clone(&graph), ports, llm, config.mock).await;
    Ok((graph, stoppage))
}
