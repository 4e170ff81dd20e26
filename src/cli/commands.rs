//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::TreeStore;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Node, TreeAction, TreeState};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { nodes }) => cmd_show(nodes),
        Some(Commands::Apply {
            nodes,
            actions,
            json,
            strict,
        }) => cmd_apply(cli.config.as_deref(), nodes, actions, *json, *strict),
        Some(Commands::Config { command }) => cmd_config(cli.config.as_deref(), command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn print_tree(state: &TreeState) {
    if state.tree.is_empty() {
        output::detail(&"(empty)");
    }
    for root in &state.tree {
        output::info(&root.to_tree_string());
    }
}

#[instrument]
fn cmd_show(nodes: &Path) -> CliResult<()> {
    let nodes: Vec<Node> = read_json(nodes)?;
    debug!("loaded {} nodes", nodes.len());
    print_tree(&TreeState::new(nodes));
    Ok(())
}

#[instrument]
fn cmd_apply(
    config: Option<&Path>,
    nodes: &Path,
    actions: &Path,
    json: bool,
    strict: bool,
) -> CliResult<()> {
    let settings = Settings::load(config)?;
    let nodes: Vec<Node> = read_json(nodes)?;
    let actions: Vec<TreeAction> = read_json(actions)?;
    let mut store = TreeStore::with_nodes(nodes, settings.rank.allocator());

    let mut rejected = 0;
    for (index, action) in actions.iter().enumerate() {
        match store.dispatch(action) {
            Ok(()) => debug!(index, action = action.name(), "applied"),
            Err(e) if strict => {
                return Err(CliError::Rejected {
                    index,
                    action: action.name().to_string(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                rejected += 1;
                output::warning(&format!("action {} ({}) rejected: {}", index, action.name(), e));
            }
        }
    }

    let state = store.state();
    if json {
        let rendered = serde_json::to_string_pretty(&state.nodes).map_err(CliError::Render)?;
        output::info(&rendered);
        return Ok(());
    }

    print_tree(state);
    if let Some(selected) = &state.selected_id {
        output::detail(&format!("selected: {}", selected));
    }
    if let Some(session) = &state.inline_create {
        output::detail(&format!("inline create open: {}", session.temp_id));
    }
    if rejected == 0 {
        output::success(&format!("{} actions applied", actions.len()));
    } else {
        output::failure(&format!("{} of {} actions rejected", rejected, actions.len()));
    }
    Ok(())
}

#[instrument]
fn cmd_config(config: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config)?;
            output::header(&"Effective settings");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning(&"no config directory available on this platform"),
        },
    }
    Ok(())
}
