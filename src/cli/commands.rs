//! CLI command implementations

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::errors::AppError;
use crate::network::{Network, TreeNodeConvert};
use crate::node::NodeKind;

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let local_dir = resolve_config_dir(cli)?;
    let settings = Settings::load(Some(&local_dir))?;
    debug!(?settings, "effective settings");

    match &cli.command {
        Some(Commands::Check { file }) => check(&resolve_file(file.as_deref(), &settings)?, &settings),
        Some(Commands::Tree { file }) => tree(&resolve_file(file.as_deref(), &settings)?, &settings),
        Some(Commands::Order { file, post }) => {
            order(&resolve_file(file.as_deref(), &settings)?, *post, &settings)
        }
        Some(Commands::Config { command }) => config_command(command, &settings, &local_dir),
        Some(Commands::Completion { shell }) => {
            completion(*shell);
            Ok(())
        }
        None => Ok(()),
    }
}

fn resolve_config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "not a directory: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| AppError::io("get current directory", Path::new("."), e).into()),
    }
}

/// Command line argument wins over the configured default.
fn resolve_file(file: Option<&Path>, settings: &Settings) -> CliResult<PathBuf> {
    file.map(Path::to_path_buf)
        .or_else(|| settings.network.file.clone())
        .ok_or_else(|| AppError::NoNetworkFile.into())
}

#[instrument(skip(settings))]
fn check(file: &Path, settings: &Settings) -> CliResult<()> {
    let network = crate::compose(file, settings)?;
    let root = network
        .root()
        .map(|k| k.to_string())
        .unwrap_or_else(|| "none".to_string());

    output::success(&format!("network composed: {}", file.display()));
    output::action("root", &root);
    output::action("nodes", &network.len());
    output::detail(&format!("leaves:   {}", network.count(NodeKind::Leaf)));
    output::detail(&format!("internal: {}", network.count(NodeKind::Internal)));
    output::detail(&format!("ghosts:   {}", network.ghost_count()));
    output::action("depth", &network.depth());
    Ok(())
}

#[instrument(skip(settings))]
fn tree(file: &Path, settings: &Settings) -> CliResult<()> {
    let network = crate::compose(file, settings)?;
    output::info(&network.to_tree_string());
    Ok(())
}

#[instrument(skip(settings))]
fn order(file: &Path, post: bool, settings: &Settings) -> CliResult<()> {
    let network = crate::compose(file, settings)?;
    output::info(&traversal_line(&network, post)?);
    Ok(())
}

/// Keys of the whole network in pre- or post-order, space separated.
fn traversal_line(network: &Network, post: bool) -> CliResult<String> {
    let Some(root) = network.root_node() else {
        return Ok(String::new());
    };
    let nodes = if post {
        root.post_order_traversal()
    } else {
        root.pre_order_traversal()
    }
    .map_err(|e| AppError::Network(e.into()))?;
    Ok(nodes.iter().map(|node| node.id()).join(" "))
}

fn config_command(command: &ConfigCommands, settings: &Settings, local_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("# effective configuration");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| location(&p))
                .unwrap_or_else(|| "unavailable".to_string());
            output::action("global", &global);
            output::action("local", &location(&local_config_path(local_dir)));
        }
    }
    Ok(())
}

fn location(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

fn completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
}
