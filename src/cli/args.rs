//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Inspect ordered trees and replay edits against them
#[derive(Parser, Debug)]
#[command(name = "ranktree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree stored in a node JSON file
    Show {
        /// JSON array of nodes
        #[arg(value_hint = ValueHint::FilePath)]
        nodes: PathBuf,
    },

    /// Replay actions against a node file and print the result
    Apply {
        /// JSON array of nodes
        #[arg(value_hint = ValueHint::FilePath)]
        nodes: PathBuf,

        /// JSON array of actions, e.g. [{"type": "indent", "id": "2"}]
        #[arg(value_hint = ValueHint::FilePath)]
        actions: PathBuf,

        /// Print the resulting nodes as JSON instead of a tree
        #[arg(long)]
        json: bool,

        /// Stop at the first rejected action
        #[arg(long)]
        strict: bool,
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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,

    /// Show the global config file location
    Path,
}
