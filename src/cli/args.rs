//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{TraversalOrder, TreeMode, Value};

/// Build, balance and traverse trees the way the visualizer does
#[derive(Parser, Debug)]
#[command(name = "treeviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raise log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Additional config file, applied over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert values in order and print the resulting tree
    Build {
        /// Insertion mode (default: from config)
        #[arg(short, long)]
        mode: Option<TreeMode>,

        /// Also print the edge list
        #[arg(short, long)]
        edges: bool,

        /// Print node placements for a WIDTH x HEIGHT viewport
        #[arg(short, long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
        layout: Option<Vec<f64>>,

        /// Values to insert
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<Value>,
    },

    /// Build a tree and animate a traversal over it
    Traverse {
        /// Insertion mode (default: from config)
        #[arg(short, long)]
        mode: Option<TreeMode>,

        /// Traversal order: pre, in, post
        #[arg(short, long, default_value_t = TraversalOrder::PreOrder)]
        order: TraversalOrder,

        /// Pause between steps (default: from config)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Values to insert
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<Value>,
    },

    /// Describe a tree mode and its operation complexities
    Info {
        /// Mode to describe (default: all)
        #[arg(short, long)]
        mode: Option<TreeMode>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_negative_values_when_parsing_build_then_accepted() {
        let cli = Cli::try_parse_from(["treeviz", "build", "-m", "avl", "3", "-1", "2.5"])
            .expect("valid args");
        match cli.command {
            Some(Commands::Build { mode, values, .. }) => {
                assert_eq!(mode, Some(TreeMode::Avl));
                assert_eq!(values, vec![3.0, -1.0, 2.5]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_repeated_debug_flag_when_parsing_then_counts() {
        let cli = Cli::try_parse_from(["treeviz", "-ddd", "info"]).expect("valid args");
        assert_eq!(cli.debug, 3);
    }

    #[test]
    fn given_order_alias_when_parsing_traverse_then_resolves() {
        let cli = Cli::try_parse_from(["treeviz", "traverse", "-o", "post", "1", "2"])
            .expect("valid args");
        assert!(matches!(
            cli.command,
            Some(Commands::Traverse {
                order: TraversalOrder::PostOrder,
                ..
            })
        ));
    }
}
