//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Project version graph for source preprocessing
#[derive(Parser, Debug)]
#[command(name = "ppgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding the local config (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Manifest and main project selection shared by graph commands.
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// Graph manifest
    #[arg(short, long, default_value = "preprocess-graph.toml", value_hint = ValueHint::FilePath)]
    pub manifest: PathBuf,

    /// Main project (overrides manifest and settings)
    #[arg(long, env = "PPGRAPH_MAIN")]
    pub main: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the rooted project tree
    Tree {
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Show a project node
    Find {
        /// Project identifier
        project: String,
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Show the parent of a project and the edge leading to it
    Parent {
        /// Project identifier
        project: String,
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Show the mapping chain from the root to a project
    Chain {
        /// Project identifier
        project: String,
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Show graph summary and unreachable projects
    Info {
        #[command(flatten)]
        graph: GraphArgs,
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

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
