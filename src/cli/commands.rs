//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::LoadedGraph;
use crate::cli::args::{Cli, Commands, ConfigCommands, GraphArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::ProjectTree;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree { graph }) => cmd_tree(cli, graph),
        Some(Commands::Find { project, graph }) => cmd_find(cli, graph, project),
        Some(Commands::Parent { project, graph }) => cmd_parent(cli, graph, project),
        Some(Commands::Chain { project, graph }) => cmd_chain(cli, graph, project),
        Some(Commands::Info { graph }) => cmd_info(cli, graph),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.project_dir.as_deref())?;
    Ok(ServiceContainer::new(settings))
}

fn open_graph(cli: &Cli, args: &GraphArgs) -> CliResult<LoadedGraph> {
    let loaded = container(cli)?
        .manifest_service()
        .open(&args.manifest, args.main.as_deref())?;
    debug!(
        "opened {} with main project {}",
        loaded.manifest_path.display(),
        loaded.main_project
    );
    Ok(loaded)
}

fn require_tree(loaded: &mut LoadedGraph) -> CliResult<&ProjectTree> {
    let manifest = loaded.manifest_path.display().to_string();
    let main = loaded.main_project.clone();
    loaded
        .graph
        .root_node(&main)?
        .ok_or_else(|| CliError::Usage(format!("{} declares no projects", manifest)))
}

fn not_in_tree(project: &str) -> CliError {
    CliError::InvalidArgs(format!("project not in tree: {}", project))
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, args: &GraphArgs) -> CliResult<()> {
    let mut loaded = open_graph(cli, args)?;
    let tree = require_tree(&mut loaded)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_find(cli: &Cli, args: &GraphArgs, project: &str) -> CliResult<()> {
    let mut loaded = open_graph(cli, args)?;
    let tree = require_tree(&mut loaded)?;
    let node = tree
        .find_node(project)
        .and_then(|idx| tree.get_node(idx))
        .ok_or_else(|| not_in_tree(project))?;

    output::header(&node.data);
    for link in &node.children {
        if let Some(child) = tree.get_node(link.child) {
            output::detail(&format!("{} {}", link.edge, child.data));
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_parent(cli: &Cli, args: &GraphArgs, project: &str) -> CliResult<()> {
    let mut loaded = open_graph(cli, args)?;
    let tree = require_tree(&mut loaded)?;
    let target = tree.find_node(project).ok_or_else(|| not_in_tree(project))?;

    match tree.find_parent(target) {
        Some((parent_idx, edge)) => {
            if let Some(parent) = tree.get_node(parent_idx) {
                output::action("parent", &parent.data);
                output::detail(&format!("edge: {}", edge));
            }
        }
        None => output::info(&format!("{} is the root", project)),
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_chain(cli: &Cli, args: &GraphArgs, project: &str) -> CliResult<()> {
    let mut loaded = open_graph(cli, args)?;
    let tree = require_tree(&mut loaded)?;
    let target = tree.find_node(project).ok_or_else(|| not_in_tree(project))?;
    let lineage = tree.lineage(target);

    if let Some(root) = lineage.first().and_then(|idx| tree.get_node(*idx)) {
        output::header(&root.data);
    }
    for (parent_idx, child_idx) in lineage.iter().tuple_windows() {
        let (Some(parent), Some(child)) = (tree.get_node(*parent_idx), tree.get_node(*child_idx))
        else {
            continue;
        };
        if let Some((_, edge)) = tree.find_parent(*child_idx) {
            let direction = if edge.inverted { "backward" } else { "forward" };
            output::detail(&format!(
                "{} -> {} ({} -> {}, {})",
                parent.data.project, child.data.project, parent.data.mappings, child.data.mappings, direction
            ));
            if let Some(extra) = &edge.extra_mappings {
                output::detail(&format!("  extra mappings: {}", extra.display()));
            }
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_info(cli: &Cli, args: &GraphArgs) -> CliResult<()> {
    let mut loaded = open_graph(cli, args)?;
    let main = loaded.main_project.clone();
    let built = loaded.graph.build(&main)?;

    output::action("main project", built.main_project());
    match built.tree() {
        Some(tree) => {
            if let Some(root) = tree.root_node() {
                output::action("root", &root.data);
            }
            output::action("projects", &tree.len());
            output::action("depth", &tree.depth());
        }
        None => output::warning("no projects declared"),
    }
    for node in built.unreachable() {
        output::warning(&format!("unreachable: {}", node));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.project_dir.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine config directory".to_string()))?
            } else {
                local_config_path(&project_dir(cli))
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("cannot determine global config directory"),
            }
            output::action("local", &local_config_path(&project_dir(cli)).display());
        }
    }
    Ok(())
}

fn project_dir(cli: &Cli) -> PathBuf {
    cli.project_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
}
