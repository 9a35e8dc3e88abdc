use crate::cmd::{parse_path, Project};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use onboard_core::{catalog::ServiceNode, codec};
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum CatalogSubcommand {
    /// List top-level services with their codes
    List,

    /// Show the options below a service, optionally after walking a path
    Show {
        /// 1-based service index
        service: usize,
        /// 0-based child indices, e.g. 1.0
        #[arg(long, default_value = "")]
        path: String,
        /// Print the whole subtree instead of one level
        #[arg(long)]
        tree: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: CatalogSubcommand, json: bool) -> anyhow::Result<()> {
    let project = Project::load(root)?;
    match subcmd {
        CatalogSubcommand::List => list(&project, json),
        CatalogSubcommand::Show {
            service,
            path,
            tree,
        } => show(&project, service, &path, tree, json),
    }
}

#[derive(Serialize)]
struct EntryRow<'a> {
    index: usize,
    code: &'a str,
    label: &'a str,
    options: usize,
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(project: &Project, json: bool) -> anyhow::Result<()> {
    let rows: Vec<EntryRow> = project
        .catalog
        .services()
        .iter()
        .enumerate()
        .map(|(i, s)| EntryRow {
            index: i + 1,
            code: s.code(),
            label: s.label(),
            options: s.children().len(),
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    print_table(
        &["CODE", "SERVICE", "OPTIONS"],
        rows.iter()
            .map(|r| {
                vec![
                    r.code.to_string(),
                    r.label.to_string(),
                    r.options.to_string(),
                ]
            })
            .collect(),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(
    project: &Project,
    service: usize,
    raw_path: &str,
    tree: bool,
    json: bool,
) -> anyhow::Result<()> {
    let path = parse_path(raw_path)?;
    let node = project
        .catalog
        .node_at(service, &path)
        .with_context(|| format!("no catalog node at service {service} path '{raw_path}'"))?;

    if json {
        return print_json(node);
    }

    let code = codec::encode(&project.catalog, service, &path).code;
    println!("{} [{code}]", node.label());
    if node.is_leaf() {
        println!("  (no further options)");
        return Ok(());
    }
    if tree {
        print_subtree(node.children(), &code, 1);
        return Ok(());
    }
    print_table(
        &["#", "CODE", "OPTION", "OPTIONS"],
        node.children()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                vec![
                    i.to_string(),
                    format!("{code}{}", c.code()),
                    c.label().to_string(),
                    c.children().len().to_string(),
                ]
            })
            .collect(),
    );
    Ok(())
}

fn print_subtree(nodes: &[ServiceNode], prefix: &str, depth: usize) {
    for n in nodes {
        let code = format!("{prefix}{}", n.code());
        println!("{}{} [{code}]", "  ".repeat(depth), n.label());
        print_subtree(n.children(), &code, depth + 1);
    }
}
