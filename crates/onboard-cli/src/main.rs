mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    catalog::CatalogSubcommand, code::CodeSubcommand, progress::ProgressSubcommand,
    session::SessionSubcommand,
};
use onboard_core::paths::DEFAULT_SESSION;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "onboard",
    about = "Client onboarding sessions: service codes, selections and milestone progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .onboard/)
    #[arg(long, global = true, env = "ONBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Session name
    #[arg(long, global = true, env = "ONBOARD_SESSION", default_value = DEFAULT_SESSION)]
    session: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .onboard/ with a default config
    Init {
        /// Also write the built-in catalog to .onboard/catalog.yaml for editing
        #[arg(long)]
        with_catalog: bool,
    },

    /// Browse the service catalog
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },

    /// Encode, decode, and resolve service selection codes
    Code {
        #[command(subcommand)]
        subcommand: CodeSubcommand,
    },

    /// Drive an onboarding session
    Session {
        #[command(subcommand)]
        subcommand: SessionSubcommand,
    },

    /// Inspect and adjust milestone progress
    Progress {
        #[command(subcommand)]
        subcommand: ProgressSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { with_catalog } => cmd::init::run(&root, with_catalog, cli.json),
        Commands::Catalog { subcommand } => cmd::catalog::run(&root, subcommand, cli.json),
        Commands::Code { subcommand } => cmd::code::run(&root, subcommand, cli.json),
        Commands::Session { subcommand } => {
            cmd::session::run(&root, &cli.session, subcommand, cli.json)
        }
        Commands::Progress { subcommand } => {
            cmd::progress::run(&root, &cli.session, subcommand, cli.json)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
