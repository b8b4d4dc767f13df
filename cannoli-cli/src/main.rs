//! `cannoli` binary: compiles a canvas file, runs it, and prints named
//! output nodes plus the terminal `Stoppage`.

use std::path::PathBuf;

use cannoli_core::object::{ContentKind, NodeSubtype};
use clap::Parser;

use cannoli_cli::{run_with_config, CliConfig};

#[derive(Parser, Debug)]
#[command(name = "cannoli")]
#[command(about = "Compiles and runs a Cannoli canvas file")]
struct Args {
    /// Path to the canvas JSON file to run.
    canvas_path: PathBuf,

    /// Run against mock collaborators and a scripted LLM instead of a live provider.
    #[arg(long)]
    mock: bool,

    /// Queued mock LLM response text, one per `--mock-response` flag, consumed in order.
    /// Only meaningful with `--mock`.
    #[arg(long = "mock-response", value_name = "TEXT")]
    mock_responses: Vec<String>,

    /// Sampling temperature 0-2, lower is more deterministic (e.g. 0.2).
    #[arg(short, long, value_name = "FLOAT")]
    temperature: Option<f32>,

    /// Print a status line per object transition to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    #[cfg(feature = "tracing")]
    if args.verbose {
        tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();
    }

    let mut config = match CliConfig::from_env(args.canvas_path.clone(), args.mock) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    config.mock_responses = args.mock_responses;
    if let Some(t) = args.temperature {
        config.temperature = Some(t);
    }
    config.verbose = args.verbose;

    let (graph, stoppage) = match run_with_config(&config).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    for node in graph.nodes.values() {
        if !matches!(node.subtype, NodeSubtype::Content(ContentKind::Output)) {
            continue;
        }
        let label = node.name.as_deref().unwrap_or(node.id());
        let content = node.buffer.lock().expect("node buffer lock poisoned").content.clone().unwrap_or_default();
        println!("[{}] {}", label, content);
    }

    println!("---");
    println!("reason: {:?}", stoppage.reason);

    if matches!(stoppage.reason, cannoli_core::scheduler::StoppageReason::Stalled | cannoli_core::scheduler::StoppageReason::Error(_)) {
        std::process::exit(1);
    }

    Ok(())
}
