use crate::catalog::Catalog;
use crate::detail::{resolve_service_detail, Resolution};
use crate::error::{OnboardError, Result};
use crate::form::{AuthState, ContactDetails, FormField, FormState};
use crate::notify::{
    proposal_message, Channel, DeliveryOutcome, DeliveryRequest, EmailRequest, ServiceDetailsUpdate,
    ServicesUpdate, SmsRequest,
};
use crate::progress::ProgressTracker;
use crate::store::SnapshotStore;
use crate::types::{ContractMode, Milestone, MILESTONE_COUNT};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const FORM_KEY: &str = "form_state";
pub const PROGRESS_KEY: &str = "progress";
pub const AUTH_KEY: &str = "auth";

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// Read-only view for sidebars, gating and reports.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<'a> {
    pub form: &'a FormState,
    pub auth: &'a AuthState,
    pub milestones: [bool; MILESTONE_COUNT],
    pub current_step: usize,
    pub active_step: Milestone,
    pub active_step_index: usize,
    pub complete: bool,
    pub version: u64,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One onboarding session: form data, milestone progress and auth, with an
/// injected snapshot store. All mutations are synchronous; every one that
/// changes something recomputes derived milestones and persists.
pub struct Session<'c, S: SnapshotStore> {
    catalog: &'c Catalog,
    store: S,
    form: FormState,
    progress: ProgressTracker,
    auth: AuthState,
}

impl<'c, S: SnapshotStore> Session<'c, S> {
    /// A fresh, empty session. Nothing is written until the first mutation.
    pub fn start(catalog: &'c Catalog, store: S, mode: ContractMode) -> Self {
        Self {
            catalog,
            store,
            form: FormState::new(),
            progress: ProgressTracker::new(mode),
            auth: AuthState::default(),
        }
    }

    /// Rebuild a session from its snapshots. Missing or unreadable snapshots
    /// fall back to empty state.
    pub fn restore(catalog: &'c Catalog, store: S, mode: ContractMode) -> Self {
        let form: FormState = load_or_default(&store, FORM_KEY);
        let progress = load_or_default::<ProgressTracker, S>(&store, PROGRESS_KEY).with_mode(mode);
        let auth: AuthState = load_or_default(&store, AUTH_KEY);
        let mut session = Self {
            catalog,
            store,
            form,
            progress,
            auth,
        };
        session.form.refresh_service_details(catalog);
        session
            .progress
            .recompute_derived_milestones(&session.form, &session.auth);
        session
    }

    // ---------------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn active_step_index(&self) -> usize {
        self.progress.get_active_step_index()
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            form: &self.form,
            auth: &self.auth,
            milestones: *self.progress.milestones(),
            current_step: self.progress.current_step(),
            active_step: self.progress.active_step(),
            active_step_index: self.progress.get_active_step_index(),
            complete: self.progress.is_complete(),
            version: self.progress.version(),
        }
    }

    // ---------------------------------------------------------------------------
    // Form mutations
    // ---------------------------------------------------------------------------

    pub fn set_field(&mut self, field: FormField, value: &str) -> bool {
        let changed = self.form.set_field(field, value);
        self.after_mutation(changed)
    }

    pub fn select_service(&mut self, index: usize) -> Result<bool> {
        self.require_service(index)?;
        let changed = self.form.select_service(index);
        Ok(self.after_mutation(changed))
    }

    pub fn deselect_service(&mut self, index: usize) -> bool {
        let changed = self.form.deselect_service(index);
        self.after_mutation(changed)
    }

    /// Record the walk into a service's options, selecting the service if
    /// needed. Returns how the path resolves.
    pub fn set_selection_path(&mut self, index: usize, path: Vec<usize>) -> Result<Resolution> {
        self.require_service(index)?;
        let resolution = resolve_service_detail(self.catalog, index, &path)
            .ok_or(OnboardError::ServiceNotFound(index))?;
        let selected = self.form.select_service(index);
        let changed = self.form.selection_path(index) != path.as_slice();
        if changed {
            self.form.set_selection_path(index, path);
        }
        self.after_mutation(selected || changed);
        Ok(resolution)
    }

    // ---------------------------------------------------------------------------
    // Navigation events
    // ---------------------------------------------------------------------------

    /// The proposal preview screen was shown.
    pub fn view_preview(&mut self) -> bool {
        let changed = self.progress.complete(Milestone::Preview);
        self.after_mutation(changed)
    }

    /// Validate and record contact details. Invalid input leaves state untouched.
    pub fn submit_contact(&mut self, contact: ContactDetails) -> Result<bool> {
        contact.validate()?;
        let contact_changed = self.form.contact.as_ref() != Some(&contact);
        self.form.contact = Some(contact);
        let completed = self.progress.complete(Milestone::ShareDetails);
        Ok(self.after_mutation(contact_changed || completed))
    }

    /// Record an authenticated user; this also satisfies ShareDetails.
    pub fn sign_in(&mut self, auth: AuthState) -> bool {
        let authenticated = auth.is_authenticated();
        let changed = self.auth != auth;
        self.auth = auth;
        let completed = authenticated && self.progress.complete(Milestone::ShareDetails);
        self.after_mutation(changed || completed)
    }

    /// Build the payload for delivering the proposal over `channel`.
    pub fn delivery_request(&self, channel: Channel) -> Result<DeliveryRequest> {
        match channel {
            Channel::Email => {
                let to = self
                    .auth
                    .email
                    .clone()
                    .or_else(|| self.form.contact.as_ref().map(|c| c.email.clone()))
                    .unwrap_or_default();
                Ok(DeliveryRequest::Email(EmailRequest::new(to)?))
            }
            Channel::Sms | Channel::WhatsApp => {
                let contact = self.form.contact.as_ref();
                let to = contact.map(ContactDetails::full_phone).unwrap_or_default();
                let message =
                    proposal_message(contact.map(|c| c.name.as_str()), &self.form.service_details);
                let req = SmsRequest::new(to, message)?;
                Ok(if channel == Channel::Sms {
                    DeliveryRequest::Sms(req)
                } else {
                    DeliveryRequest::WhatsApp(req)
                })
            }
        }
    }

    /// React to a delivery result. Only success moves state; a failure
    /// leaves every milestone as it was.
    pub fn record_delivery(&mut self, channel: Channel, outcome: &DeliveryOutcome) -> bool {
        if !outcome.success {
            tracing::info!(
                %channel,
                reason = outcome.message.as_deref().unwrap_or(""),
                "proposal delivery failed"
            );
            return false;
        }
        let flag_changed = !self.form.proposal_sent;
        self.form.proposal_sent = true;
        let completed = self.progress.complete(Milestone::ProposalSent);
        self.after_mutation(flag_changed || completed)
    }

    // ---------------------------------------------------------------------------
    // Direct milestone access
    // ---------------------------------------------------------------------------

    pub fn set_milestone(&mut self, index: usize, value: bool) -> Result<bool> {
        let changed = self.progress.set_milestone(index, value)?;
        self.persist_if(changed);
        Ok(changed)
    }

    pub fn complete_milestone(&mut self, index: usize) -> Result<bool> {
        let changed = self.progress.complete_milestone(index)?;
        self.persist_if(changed);
        Ok(changed)
    }

    // ---------------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------------

    /// Clear form data and every milestone; auth is kept.
    pub fn reset(&mut self) {
        self.form = FormState::new();
        self.progress.reset();
        self.persist();
    }

    /// Reset and forget the user, removing stored snapshots.
    pub fn logout(&mut self) {
        self.form = FormState::new();
        self.progress.reset();
        self.auth = AuthState::default();
        for key in [FORM_KEY, PROGRESS_KEY, AUTH_KEY] {
            if let Err(e) = self.store.remove_snapshot(key) {
                tracing::warn!(key, error = %e, "failed to remove session snapshot");
            }
        }
    }

    // ---------------------------------------------------------------------------
    // Backend sync payloads
    // ---------------------------------------------------------------------------

    pub fn services_payload(&self) -> ServicesUpdate {
        ServicesUpdate::from_labels(&self.catalog.labels_for(&self.form.selected_services))
    }

    pub fn service_details_payload(&self) -> ServiceDetailsUpdate {
        ServiceDetailsUpdate {
            service_details: self.form.service_details.clone(),
        }
    }

    // ---------------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------------

    fn require_service(&self, index: usize) -> Result<()> {
        match self.catalog.get_catalog_entry(index) {
            Some(_) => Ok(()),
            None => Err(OnboardError::ServiceNotFound(index)),
        }
    }

    fn after_mutation(&mut self, changed: bool) -> bool {
        if !changed {
            return false;
        }
        self.form.refresh_service_details(self.catalog);
        self.progress
            .recompute_derived_milestones(&self.form, &self.auth);
        self.persist();
        true
    }

    fn persist_if(&mut self, changed: bool) {
        if changed {
            self.persist();
        }
    }

    /// Best effort: a failed write is logged and retried by the next mutation.
    fn persist(&mut self) {
        let snapshots = [
            (FORM_KEY, serde_json::to_value(&self.form)),
            (PROGRESS_KEY, serde_json::to_value(&self.progress)),
            (AUTH_KEY, serde_json::to_value(&self.auth)),
        ];
        for (key, value) in snapshots {
            let result = value
                .map_err(OnboardError::from)
                .and_then(|v| self.store.save_snapshot(key, &v));
            if let Err(e) = result {
                tracing::warn!(key, error = %e, "failed to persist session snapshot");
            }
        }
    }
}

fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: SnapshotStore,
{
    match store.load_snapshot(key) {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "discarding unreadable session snapshot");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to load session snapshot");
            T::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
