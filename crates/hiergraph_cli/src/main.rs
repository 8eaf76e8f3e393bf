//! Command-line front end for one-shot graph builds.
//!
//! # Responsibility
//! - Load a workspace snapshot and optional settings from JSON files.
//! - Run one build and print the graph, ranked neighbours, errors or typed links.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hiergraph_core::metadata::normalize_documents;
use hiergraph_core::{
    build_graph, collect_typed_links, default_log_level, init_logging, BuildErrors, FieldTable,
    GraphSnapshot, InMemoryWorkspace, LoggingConfig, Settings,
};
use log::info;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hiergraph")]
#[command(version, about = "Relation graph builder for document workspaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace snapshot (JSON)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Settings file (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; logs go to stderr otherwise
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every node and edge
    Graph,
    /// Print the ranked targets of one document for one field
    Neighbours {
        /// Document path
        path: String,
        /// Hierarchy field name
        #[arg(short, long)]
        field: String,
    },
    /// Print non-fatal build errors
    Errors,
    /// Print typed links found in document content
    TypedLinks,
    /// Print the core version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.clone().unwrap_or_else(|| match cli.log_dir {
        Some(_) => default_log_level().to_string(),
        None => "warn".to_string(),
    });
    let logging = LoggingConfig {
        level,
        log_dir: cli.log_dir.clone(),
    };
    init_logging(&logging).context("failed to initialize logging")?;

    if let Commands::Version = cli.command {
        println!("hiergraph_core version={}", hiergraph_core::core_version());
        return Ok(());
    }

    let workspace_path = cli
        .workspace
        .as_deref()
        .context("--workspace <FILE> is required for this command")?;
    let workspace = load_workspace(workspace_path)?;
    let settings = match cli.settings.as_deref() {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("failed to load settings `{}`", path.display()))?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Graph => cmd_graph(&build(&workspace, &settings), cli.format),
        Commands::Neighbours { path, field } => {
            cmd_neighbours(&build(&workspace, &settings), &path, &field, cli.format)
        }
        Commands::Errors => cmd_errors(&build(&workspace, &settings), cli.format),
        Commands::TypedLinks => cmd_typed_links(&workspace, &settings, cli.format),
        Commands::Version => Ok(()),
    }
}

fn load_workspace(path: &Path) -> anyhow::Result<InMemoryWorkspace> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workspace `{}`", path.display()))?;
    InMemoryWorkspace::from_json_str(&text)
        .with_context(|| format!("invalid workspace snapshot `{}`", path.display()))
}

fn build(workspace: &InMemoryWorkspace, settings: &Settings) -> GraphSnapshot {
    let snapshot = build_graph(workspace, settings);
    info!(
        "event=cli_build module=cli status=ok build_id={} documents={}",
        snapshot.build_id,
        workspace.len()
    );
    snapshot
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_graph(snapshot: &GraphSnapshot, format: OutputFormat) -> anyhow::Result<()> {
    let graph = &snapshot.graph;
    match format {
        OutputFormat::Json => {
            let nodes: Vec<_> = graph
                .nodes()
                .map(|(path, attrs)| json!({ "path": path, "resolved": attrs.resolved }))
                .collect();
            let edges: Vec<_> = graph.edges().collect();
            print_json(&json!({
                "build_id": snapshot.build_id.to_string(),
                "nodes": nodes,
                "edges": edges,
                "errors": snapshot.errors,
            }))
        }
        OutputFormat::Text => {
            println!(
                "nodes={} edges={} explicit={} errors={}",
                graph.node_count(),
                graph.edge_count(),
                graph.explicit_edge_count(),
                snapshot.errors.len()
            );
            for (path, attrs) in graph.nodes() {
                let marker = if attrs.resolved { "" } else { " (virtual)" };
                println!("node {path}{marker}");
            }
            for edge in graph.edges() {
                println!(
                    "edge {} -[{}]-> {} {} {}",
                    edge.source(),
                    edge.field(),
                    edge.target(),
                    edge.attrs.direction,
                    edge.attrs.provenance
                );
            }
            Ok(())
        }
    }
}

fn cmd_neighbours(
    snapshot: &GraphSnapshot,
    path: &str,
    field: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if !snapshot.field_table.contains(field) {
        anyhow::bail!("unknown hierarchy field `{field}`");
    }
    if !snapshot.graph.has_node(path) {
        anyhow::bail!("no node for `{path}`");
    }

    let ranked = snapshot.ranked_targets(path, field);
    match format {
        OutputFormat::Json => print_json(&json!(ranked)),
        OutputFormat::Text => {
            for edge in ranked {
                let order = edge
                    .attrs
                    .target_order
                    .map(|order| order.as_number().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let kind = if edge.attrs.explicit { "explicit" } else { "implied" };
                println!("{} order={order} {kind}", edge.target());
            }
            Ok(())
        }
    }
}

fn cmd_errors(snapshot: &GraphSnapshot, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!(snapshot.errors)),
        OutputFormat::Text => {
            if snapshot.errors.is_empty() {
                println!("no errors");
            }
            for err in &snapshot.errors {
                println!("{} {} {}", err.code, err.path, err.message);
            }
            Ok(())
        }
    }
}

fn cmd_typed_links(
    workspace: &InMemoryWorkspace,
    settings: &Settings,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut errors = BuildErrors::new();
    let table = FieldTable::from_hierarchies(&settings.hierarchies, &mut errors);
    let records = normalize_documents(workspace, settings.metadata_backend, &mut errors);
    let links = collect_typed_links(workspace, &records, &table, &mut errors);

    match format {
        OutputFormat::Json => print_json(&json!({
            "links": links,
            "errors": errors.into_vec(),
        })),
        OutputFormat::Text => {
            for (path, lines) in &links {
                for line in lines {
                    println!("{path} {} {}", line.link_type, line.targets.join(", "));
                }
            }
            for err in errors.iter() {
                println!("error {} {} {}", err.code, err.path, err.message);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat};
    use clap::Parser;

    #[test]
    fn parses_neighbours_with_global_flags() {
        let cli = Cli::try_parse_from([
            "hiergraph",
            "neighbours",
            "A.md",
            "--field",
            "down",
            "--workspace",
            "ws.json",
            "--format",
            "json",
        ])
        .expect("valid arguments");

        assert!(cli.format == OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Neighbours { ref path, ref field } if path == "A.md" && field == "down"
        ));
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["hiergraph", "graph", "--format", "yaml"]).is_err());
    }
}
