use crate::cmd::{parse_path, Project};
use crate::output::{check, print_json, print_table};
use clap::{Subcommand, ValueEnum};
use onboard_core::{
    form::{AuthState, ContactDetails, FormField, DEFAULT_COUNTRY_CODE},
    notify::{Channel, DeliveryOutcome},
    report::{proposal_rows, ListingEntry},
    session::Session,
    store::FileStore,
    types::Milestone,
};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Show form data, selections and milestone state
    Show,

    /// Set a basic-details field (blank clears it)
    Set {
        /// responsibility, business_category, valuation_range, currency, employee_count
        field: String,
        value: String,
    },

    /// Add a service to the selection
    Select {
        /// 1-based service index
        service: usize,
    },

    /// Remove a service from the selection
    Deselect {
        /// 1-based service index
        service: usize,
    },

    /// Record the option path chosen for a service
    Path {
        /// 1-based service index
        service: usize,
        /// 0-based child indices, e.g. 1.0
        path: String,
    },

    /// Mark the proposal preview as viewed
    Preview,

    /// Submit contact details
    Share {
        name: String,
        phone: String,
        email: String,
        #[arg(long, default_value = DEFAULT_COUNTRY_CODE)]
        country_code: String,
    },

    /// Record a signed-in user
    Login {
        user_id: String,
        email: Option<String>,
    },

    /// Print the delivery request for a channel
    Request {
        /// email, sms or whatsapp
        channel: String,
    },

    /// Record the result of delivering the proposal
    Deliver {
        /// email, sms or whatsapp
        channel: String,
        /// Record a failed delivery with this message
        #[arg(long, value_name = "MESSAGE")]
        failed: Option<String>,
    },

    /// Print a backend sync payload
    Payload {
        #[arg(value_enum)]
        kind: PayloadKind,
    },

    /// Show the session as a user-listing entry
    Listing,

    /// Clear form data and milestones, keeping the signed-in user
    Reset,

    /// Clear everything and delete the stored session
    Logout,
}

impl SessionSubcommand {
    /// Logout is left out: it only deletes.
    fn mutates(&self) -> bool {
        !matches!(
            self,
            SessionSubcommand::Show
                | SessionSubcommand::Request { .. }
                | SessionSubcommand::Payload { .. }
                | SessionSubcommand::Listing
                | SessionSubcommand::Logout
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PayloadKind {
    Services,
    Details,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, name: &str, subcmd: SessionSubcommand, json: bool) -> anyhow::Result<()> {
    let project = Project::load(root)?;
    let mut session = project.open_session(root, name)?;
    if subcmd.mutates() {
        project.apply_defaults(&mut session);
    }

    match subcmd {
        SessionSubcommand::Show => show(&session, json),
        SessionSubcommand::Set { field, value } => {
            let field: FormField = field.parse()?;
            field.check_value(&value)?;
            let changed = session.set_field(field, &value);
            report(&session, changed, &format!("set {field}"), json)
        }
        SessionSubcommand::Select { service } => {
            let changed = session.select_service(service)?;
            report(&session, changed, &format!("selected service {service}"), json)
        }
        SessionSubcommand::Deselect { service } => {
            let changed = session.deselect_service(service);
            report(&session, changed, &format!("deselected service {service}"), json)
        }
        SessionSubcommand::Path { service, path } => {
            let path = parse_path(&path)?;
            let resolution = session.set_selection_path(service, path)?;
            if json {
                return print_json(&resolution);
            }
            println!("{}", resolution.detail.labels().join(" / "));
            if !resolution.complete {
                println!("(further options available)");
            }
            Ok(())
        }
        SessionSubcommand::Preview => {
            let changed = session.view_preview();
            report(&session, changed, "preview viewed", json)
        }
        SessionSubcommand::Share {
            name,
            phone,
            email,
            country_code,
        } => {
            let contact = ContactDetails::new(name, phone, email).with_country_code(country_code);
            let changed = session.submit_contact(contact)?;
            report(&session, changed, "contact details saved", json)
        }
        SessionSubcommand::Login { user_id, email } => {
            let auth = AuthState {
                user_id: Some(user_id),
                email,
            };
            let changed = session.sign_in(auth);
            report(&session, changed, "signed in", json)
        }
        SessionSubcommand::Request { channel } => {
            let channel: Channel = channel.parse()?;
            let request = session.delivery_request(channel)?;
            if json {
                return print_json(&request);
            }
            println!("{} -> {}", request.channel(), request.recipient());
            Ok(())
        }
        SessionSubcommand::Deliver { channel, failed } => {
            let channel: Channel = channel.parse()?;
            let outcome = match failed {
                Some(message) => DeliveryOutcome::failed(message),
                None => DeliveryOutcome::delivered(),
            };
            let changed = session.record_delivery(channel, &outcome);
            let summary = if outcome.success {
                format!("proposal sent via {channel}")
            } else {
                format!("delivery via {channel} failed")
            };
            report(&session, changed, &summary, json)
        }
        SessionSubcommand::Payload { kind } => match kind {
            PayloadKind::Services => print_json(&session.services_payload()),
            PayloadKind::Details => print_json(&session.service_details_payload()),
        },
        SessionSubcommand::Listing => listing(&session, name, json),
        SessionSubcommand::Reset => {
            session.reset();
            report(&session, true, "session reset", json)
        }
        SessionSubcommand::Logout => {
            session.logout();
            report(&session, true, "logged out", json)
        }
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn report(
    session: &Session<'_, FileStore>,
    changed: bool,
    summary: &str,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "changed": changed,
            "active_step": session.progress().active_step(),
            "active_step_index": session.active_step_index(),
            "milestones": session.progress().milestones(),
        }));
    }
    if changed {
        println!("{summary}");
    } else {
        println!("{summary} (no change)");
    }
    println!("Active step: {}", session.progress().active_step().title());
    Ok(())
}

fn show(session: &Session<'_, FileStore>, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&session.snapshot());
    }

    let form = session.form();
    for field in FormField::all() {
        println!("{:<18} {}", field.as_str(), form.field(*field).unwrap_or("-"));
    }
    if let Some(contact) = &form.contact {
        println!("{:<18} {} {} {}", "contact", contact.name, contact.full_phone(), contact.email);
    }
    if let Some(user) = &session.auth().user_id {
        println!("{:<18} {user}", "signed in as");
    }
    println!();

    if !form.service_details.is_empty() {
        print_table(
            &["SERVICE", "OPTION", "SUB-OPTION"],
            proposal_rows(&form.service_details)
                .into_iter()
                .map(|r| vec![r.service, r.option, r.sub_option])
                .collect(),
        );
        println!();
    }

    let milestones = session.progress().milestones();
    let active = session.active_step_index();
    for m in Milestone::all() {
        let marker = if m.index() == active { " <" } else { "" };
        println!("{} {}{marker}", check(milestones[m.index()]), m.title());
    }
    Ok(())
}

fn listing(session: &Session<'_, FileStore>, name: &str, json: bool) -> anyhow::Result<()> {
    let display_name = session
        .form()
        .contact
        .as_ref()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| name.to_string());
    let entry = ListingEntry::from_stored(
        session.catalog(),
        display_name,
        &session.services_payload().services,
        &session.form().service_details,
    );

    if json {
        return print_json(&entry);
    }

    println!("{}", entry.name);
    println!("  services: {}", entry.selected_services.join(", "));
    for d in &entry.service_details {
        println!(
            "  [{}] {}",
            d.code.as_deref().unwrap_or("?"),
            d.labels.join(" / ")
        );
    }
    let retired = entry.retired_services(session.catalog());
    if !retired.is_empty() {
        println!("  no longer offered: {}", retired.join(", "));
    }
    Ok(())
}
