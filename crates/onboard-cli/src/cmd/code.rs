use crate::cmd::{parse_path, Project};
use crate::output::print_json;
use clap::Subcommand;
use onboard_core::{
    codec::{self, DecodeStop},
    detail::resolve_service_detail,
    report::{proposal_rows, ListingEntry},
};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum CodeSubcommand {
    /// Build the compact code for a service and option path
    Encode {
        /// 1-based service index
        service: usize,
        /// 0-based child indices, e.g. 1.0
        #[arg(long, default_value = "")]
        path: String,
    },

    /// Turn a compact code such as 2b2 back into labels
    Decode {
        code: String,
    },

    /// Resolve a service and option path into a proposal row
    Resolve {
        /// 1-based service index
        service: usize,
        /// 0-based child indices, e.g. 1.0
        #[arg(long, default_value = "")]
        path: String,
    },

    /// Render a stored user row from its services and codes columns
    Listing {
        name: String,
        /// Comma-joined service codes, e.g. "2b5,3a"
        codes: String,
        /// Comma-joined service labels as stored
        #[arg(long, default_value = "")]
        services: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: CodeSubcommand, json: bool) -> anyhow::Result<()> {
    let project = Project::load(root)?;
    match subcmd {
        CodeSubcommand::Encode { service, path } => encode(&project, service, &path, json),
        CodeSubcommand::Decode { code } => decode(&project, &code, json),
        CodeSubcommand::Resolve { service, path } => resolve(&project, service, &path, json),
        CodeSubcommand::Listing {
            name,
            codes,
            services,
        } => listing(&project, &name, &services, &codes, json),
    }
}

// ---------------------------------------------------------------------------
// encode
// ---------------------------------------------------------------------------

fn encode(project: &Project, service: usize, raw_path: &str, json: bool) -> anyhow::Result<()> {
    let path = parse_path(raw_path)?;
    let encoded = codec::encode(&project.catalog, service, &path);

    if json {
        return print_json(&encoded);
    }

    println!("{}", encoded.code);
    if encoded.truncated {
        eprintln!(
            "warning: path truncated after {} of {} entries",
            encoded.depth,
            path.len()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

fn decode(project: &Project, code: &str, json: bool) -> anyhow::Result<()> {
    let decoded = codec::decode(&project.catalog, code);

    if json {
        return print_json(&decoded);
    }

    for label in &decoded.labels {
        println!("{label}");
    }
    if let Some(stop) = &decoded.stop {
        eprintln!("warning: {}", describe_stop(stop));
    }
    Ok(())
}

fn describe_stop(stop: &DecodeStop) -> String {
    match stop {
        DecodeStop::Empty => "empty code".to_string(),
        DecodeStop::MissingServiceIndex => "code does not start with a service index".to_string(),
        DecodeStop::UnknownService { token } => format!("no service numbered {token}"),
        DecodeStop::InvalidToken { offset } => format!("unrecognised token at offset {offset}"),
        DecodeStop::ChildrenExhausted { offset } => {
            format!("trailing characters at offset {offset} after a final option")
        }
    }
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

fn resolve(project: &Project, service: usize, raw_path: &str, json: bool) -> anyhow::Result<()> {
    let path = parse_path(raw_path)?;
    let Some(resolution) = resolve_service_detail(&project.catalog, service, &path) else {
        if json {
            return print_json(&serde_json::Value::Null);
        }
        println!("(no such service)");
        return Ok(());
    };

    if json {
        return print_json(&resolution);
    }

    for row in proposal_rows(std::slice::from_ref(&resolution.detail)) {
        println!("{} | {} | {}", row.service, row.option, row.sub_option);
    }
    if !resolution.complete {
        println!("(further options available)");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// listing
// ---------------------------------------------------------------------------

fn listing(
    project: &Project,
    name: &str,
    services: &str,
    codes: &str,
    json: bool,
) -> anyhow::Result<()> {
    let entry = ListingEntry::from_codes(&project.catalog, name, services, codes);

    if json {
        return print_json(&entry);
    }

    println!("{}", entry.name);
    for d in &entry.service_details {
        println!(
            "  [{}] {}",
            d.code.as_deref().unwrap_or("?"),
            d.labels.join(" / ")
        );
    }
    let retired = entry.retired_services(&project.catalog);
    if !retired.is_empty() {
        println!("  no longer offered: {}", retired.join(", "));
    }
    Ok(())
}
