use crate::cmd::Project;
use crate::output::{check, print_json};
use clap::Subcommand;
use onboard_core::types::Milestone;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ProgressSubcommand {
    /// Show the five milestones and the active step
    Show,

    /// Set a milestone flag directly
    Set {
        /// Milestone name (e.g. preview) or 0-based index
        milestone: String,
        /// true or false
        #[arg(action = clap::ArgAction::Set, default_value_t = true)]
        value: bool,
    },

    /// Mark a milestone complete and advance the step cursor
    Complete {
        /// Milestone name (e.g. preview) or 0-based index
        milestone: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    root: &Path,
    name: &str,
    subcmd: ProgressSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let project = Project::load(root)?;
    let mut session = project.open_session(root, name)?;
    if !matches!(subcmd, ProgressSubcommand::Show) {
        project.apply_defaults(&mut session);
    }

    let changed = match subcmd {
        ProgressSubcommand::Show => None,
        ProgressSubcommand::Set { milestone, value } => {
            Some(session.set_milestone(milestone_index(&milestone)?, value)?)
        }
        ProgressSubcommand::Complete { milestone } => {
            Some(session.complete_milestone(milestone_index(&milestone)?)?)
        }
    };

    let progress = session.progress();
    if json {
        return print_json(&serde_json::json!({
            "changed": changed,
            "milestones": progress.milestones(),
            "current_step": progress.current_step(),
            "active_step": progress.active_step(),
            "active_step_index": progress.get_active_step_index(),
            "complete": progress.is_complete(),
            "version": progress.version(),
        }));
    }

    if changed == Some(false) {
        println!("(no change)");
    }
    let active = progress.get_active_step_index();
    for m in Milestone::all() {
        let marker = if m.index() == active { " <" } else { "" };
        println!(
            "{} {}. {}{marker}",
            check(progress.is_set(*m)),
            m.index(),
            m.title()
        );
    }
    if progress.is_complete() {
        println!("All milestones complete.");
    }
    Ok(())
}

/// Numeric input is passed through untouched so out-of-range indices reach
/// the tracker's contract check.
fn milestone_index(raw: &str) -> anyhow::Result<usize> {
    if let Ok(i) = raw.parse::<usize>() {
        return Ok(i);
    }
    let milestone: Milestone = raw.parse()?;
    Ok(milestone.index())
}
