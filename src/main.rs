use clap::Parser;
use newick_graph::cli::Cli;
use newick_graph::config::Config;
use newick_graph::error::{Error, Result};
use newick_graph::graft::{GraftReport, GraftRequest, graft};
use newick_graph::store::{MemoryStore, Neo4jStore};
use std::process::ExitCode;
use std::sync::Arc;

fn init_tracing(cli: &Cli) {
    // --quiet and the default are silent, --verbose honours RUST_LOG or falls back to "info"
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(Error::Usage(msg)) => {
            println!("{msg}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(report) => {
            println!("Done in {:.3}s", report.elapsed.as_secs_f64());
            println!("Root vertex id: {}", report.root.id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<GraftReport> {
    let source = tokio::fs::read_to_string(&config.path).await?;
    let request = GraftRequest {
        tree_id: config.tree_id,
        source,
    };

    if config.dry_run {
        let store = Arc::new(MemoryStore::new());
        let report = graft(Arc::clone(&store), request, &config.graft).await?;
        let graph = store.snapshot();
        println!(
            "Dry run: {} vertices, {} edges, {} index entries",
            graph.vertices.len(),
            graph.edges.len(),
            graph.index_entries.len()
        );
        Ok(report)
    } else {
        graft(Arc::new(Neo4jStore::new(&config.store_url)), request, &config.graft).await
    }
}
