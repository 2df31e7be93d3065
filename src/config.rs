//! Run configuration, folded from the command line and environment.

use crate::cli::{Cli, Commands, usage};
use crate::engine::EngineOptions;
use crate::error::{Error, Result};
use crate::graft::GraftOptions;
use crate::newick::InternalLabels;
use crate::progress::ProgressTarget;
use std::path::{Path, PathBuf};

/// Validated settings of one graft run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tree_id: String,
    pub path: PathBuf,
    pub store_url: String,
    pub dry_run: bool,
    pub graft: GraftOptions,
}

impl Config {
    /// Builds and validates the configuration of `cli`.
    ///
    /// # Errors
    /// [Error::Usage] if the command or one of its arguments is missing,
    /// the tree id is blank, or the path is not a regular file.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let Some(Commands::Parse {
            tree_id,
            filepath,
            internal_labels,
        }) = &cli.command
        else {
            return Err(Error::Usage(usage().to_string()));
        };
        let (Some(tree_id), Some(filepath)) = (tree_id, filepath) else {
            return Err(Error::Usage(usage().to_string()));
        };

        let progress = if cli.quiet {
            ProgressTarget::Hidden
        } else {
            ProgressTarget::Stderr
        };

        Ok(Self {
            tree_id: validate_tree_id(tree_id)?,
            path: validate_path(filepath)?,
            store_url: cli.store_url.clone(),
            dry_run: cli.dry_run,
            graft: GraftOptions {
                engine: EngineOptions {
                    max_in_flight: cli.max_in_flight.map(|n| n as usize),
                },
                progress,
                internal_labels: InternalLabels::from(*internal_labels),
            },
        })
    }
}

fn validate_tree_id(tree_id: &str) -> Result<String> {
    let trimmed = tree_id.trim();
    if trimmed.is_empty() {
        return Err(Error::Usage("tree id must not be blank".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::Usage(format!("file {} does not exist", path.display())));
    }
    if !path.is_file() {
        return Err(Error::Usage(format!("{} is not a regular file", path.display())));
    }
    Ok(path.to_path_buf())
}
