//! Command line interface.

use crate::newick::InternalLabels;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default Neo4j server root.
pub const DEFAULT_STORE_URL: &str = "http://localhost:7474";

#[derive(Debug, Parser)]
#[command(name = "newick-graph", about = "Graft Newick trees into a graph database", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress logs and progress
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Root URL of the Neo4j server (user info in the URL is used for authentication)
    #[arg(long, global = true, env = "NEO4J_URL", default_value = DEFAULT_STORE_URL)]
    pub store_url: String,

    /// Maximum number of store calls in flight (unbounded if omitted)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_in_flight: Option<u32>,

    /// Graft into an in-memory graph instead of the server
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a Newick file and persist its tree
    Parse {
        /// Identifier of the tree, becomes the name of its root vertex
        tree_id: Option<String>,

        /// Path to a file holding one Newick tree
        filepath: Option<PathBuf>,

        /// How labels of internal vertices are read
        #[arg(long, value_enum, default_value_t = InternalLabelsArg::Auto)]
        internal_labels: InternalLabelsArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InternalLabelsArg {
    /// Numeric labels are bootstrap values, others are names
    Auto,
    /// Always names
    Name,
    /// Always bootstrap values
    Bootstrap,
}

impl From<InternalLabelsArg> for InternalLabels {
    fn from(arg: InternalLabelsArg) -> Self {
        match arg {
            InternalLabelsArg::Auto => InternalLabels::Auto,
            InternalLabelsArg::Name => InternalLabels::Name,
            InternalLabelsArg::Bootstrap => InternalLabels::Bootstrap,
        }
    }
}

/// Usage line printed when arguments are missing.
pub fn usage() -> &'static str {
    "usage: newick-graph parse <TREE_ID> <FILEPATH>"
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "newick-graph",
            "--store-url",
            "http://neo4j:secret@db:7474",
            "--max-in-flight",
            "8",
            "parse",
            "puffins",
            "puffins.nwk",
            "--internal-labels",
            "name",
        ])
        .unwrap();

        assert_eq!(cli.store_url, "http://neo4j:secret@db:7474");
        assert_eq!(cli.max_in_flight, Some(8));
        let Some(Commands::Parse {
            tree_id,
            filepath,
            internal_labels,
        }) = cli.command
        else {
            panic!("expected parse command");
        };
        assert_eq!(tree_id.as_deref(), Some("puffins"));
        assert_eq!(filepath, Some(PathBuf::from("puffins.nwk")));
        assert_eq!(internal_labels, InternalLabelsArg::Name);
    }

    #[test]
    fn test_missing_arguments_accepted() {
        let cli = Cli::try_parse_from(["newick-graph", "parse"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Parse {
                tree_id: None,
                filepath: None,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_in_flight_rejected() {
        assert!(Cli::try_parse_from(["newick-graph", "--max-in-flight", "0", "parse"]).is_err());
    }
}
