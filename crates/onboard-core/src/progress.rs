//! Onboarding completion state machine.
//!
//! Five ordered milestones move from `false` to `true`. Routine
//! recomputation never moves one back; only [`ProgressTracker::reset`] or an
//! explicit `set_milestone(i, false)` clears a milestone.

use crate::error::{OnboardError, Result};
use crate::form::{AuthState, FormField, FormState};
use crate::types::{ContractMode, Milestone, MILESTONE_COUNT};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DerivedMilestones
// ---------------------------------------------------------------------------

/// Milestones that follow from form data alone. Preview and ShareDetails are
/// driven by navigation events instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedMilestones {
    pub basic_details: bool,
    pub additional_services: bool,
    pub proposal_sent: bool,
}

impl DerivedMilestones {
    pub fn pairs(self) -> [(Milestone, bool); 3] {
        [
            (Milestone::BasicDetails, self.basic_details),
            (Milestone::AdditionalServices, self.additional_services),
            (Milestone::ProposalSent, self.proposal_sent),
        ]
    }
}

/// Pure and total over every reachable form shape.
pub fn derive_milestones(form: &FormState, _auth: &AuthState) -> DerivedMilestones {
    DerivedMilestones {
        basic_details: basic_details_complete(form),
        additional_services: additional_services_complete(form),
        proposal_sent: form.proposal_sent,
    }
}

pub fn basic_details_complete(form: &FormState) -> bool {
    let core = form.has(FormField::Responsibility)
        && form.has(FormField::BusinessCategory)
        && form.has(FormField::ValuationRange)
        && form.has(FormField::Currency);
    if !core {
        return false;
    }
    if form.is_escape_valuation() {
        return true;
    }
    let employees_ok = form.is_yet_to_begin() || form.has(FormField::EmployeeCount);
    employees_ok && !form.selected_services.is_empty()
}

/// Compares counts rather than matching details to services one by one.
pub fn additional_services_complete(form: &FormState) -> bool {
    !form.selected_services.is_empty()
        && form.service_details.len() == form.selected_services.len()
        && form
            .service_details
            .iter()
            .all(|d| !d.service.trim().is_empty())
}

// ---------------------------------------------------------------------------
// ProgressTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTracker {
    milestones: [bool; MILESTONE_COUNT],
    /// Cursor advanced by `complete_milestone`; distinct from the derived
    /// active step.
    current_step: usize,
    /// Incremented once per real change; unchanged by no-op updates.
    version: u64,
    #[serde(skip)]
    mode: ContractMode,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(ContractMode::default())
    }
}

impl ProgressTracker {
    pub fn new(mode: ContractMode) -> Self {
        Self {
            milestones: [false; MILESTONE_COUNT],
            current_step: 0,
            version: 0,
            mode,
        }
    }

    pub fn with_mode(mut self, mode: ContractMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ContractMode {
        self.mode
    }

    pub fn milestones(&self) -> &[bool; MILESTONE_COUNT] {
        &self.milestones
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_set(&self, milestone: Milestone) -> bool {
        self.milestones[milestone.index()]
    }

    /// Set a milestone by raw index. Returns `Ok(true)` when the value changed.
    ///
    /// An index outside `0..5` is a caller bug: an error in development
    /// mode, logged and ignored in production mode.
    pub fn set_milestone(&mut self, index: usize, value: bool) -> Result<bool> {
        match Milestone::from_index(index) {
            Some(m) => Ok(self.set(m, value)),
            None => self.contract_violation(index),
        }
    }

    /// Set a milestone by name. Returns true when the value changed.
    pub fn set(&mut self, milestone: Milestone, value: bool) -> bool {
        let slot = &mut self.milestones[milestone.index()];
        if *slot == value {
            return false;
        }
        *slot = value;
        self.version += 1;
        tracing::debug!(milestone = %milestone, value, version = self.version, "milestone changed");
        true
    }

    /// Mark a milestone complete and advance the cursor past it when it is
    /// the current step.
    pub fn complete_milestone(&mut self, index: usize) -> Result<bool> {
        match Milestone::from_index(index) {
            Some(m) => Ok(self.complete(m)),
            None => self.contract_violation(index),
        }
    }

    pub fn complete(&mut self, milestone: Milestone) -> bool {
        let changed = self.set(milestone, true);
        if self.current_step == milestone.index() {
            self.current_step = milestone.next().map_or(MILESTONE_COUNT, Milestone::index);
        }
        changed
    }

    /// Apply the data-derived milestones. A derived `true` is set; a derived
    /// `false` never clears a milestone that is already set.
    pub fn recompute_derived_milestones(&mut self, form: &FormState, auth: &AuthState) -> bool {
        let derived = derive_milestones(form, auth);
        let mut changed = false;
        for (milestone, value) in derived.pairs() {
            if value {
                changed |= self.set(milestone, true);
            }
        }
        changed
    }

    /// Index of the first incomplete milestone; the last index once all are done.
    pub fn get_active_step_index(&self) -> usize {
        self.milestones
            .iter()
            .position(|done| !done)
            .unwrap_or(MILESTONE_COUNT - 1)
    }

    pub fn active_step(&self) -> Milestone {
        Milestone::from_index(self.get_active_step_index()).unwrap_or(Milestone::ProposalSent)
    }

    pub fn is_complete(&self) -> bool {
        self.milestones.iter().all(|&done| done)
    }

    /// Clear every milestone and the cursor. Counts as a single change.
    pub fn reset(&mut self) -> bool {
        if self.milestones == [false; MILESTONE_COUNT] && self.current_step == 0 {
            return false;
        }
        self.milestones = [false; MILESTONE_COUNT];
        self.current_step = 0;
        self.version += 1;
        tracing::debug!(version = self.version, "progress reset");
        true
    }

    fn contract_violation(&self, index: usize) -> Result<bool> {
        match self.mode {
            ContractMode::Development => Err(OnboardError::InvalidMilestoneIndex(index)),
            ContractMode::Production => {
                tracing::error!(index, "ignoring out-of-range milestone index");
                Ok(false)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::detail::ServiceDetail;
    use crate::form::{VALUATION_ESCAPE, VALUATION_YET_TO_BEGIN};

    fn basic_form() -> FormState {
        let mut form = FormState::new();
        form.set_field(FormField::Responsibility, "Founder");
        form.set_field(FormField::BusinessCategory, "Retail");
        form.set_field(FormField::ValuationRange, "1-5 Cr");
        form.set_field(FormField::Currency, "INR");
        form.set_field(FormField::EmployeeCount, "11-50");
        form.select_service(1);
        form
    }

    #[test]
    fn set_milestone_twice_changes_once() {
        let mut p = ProgressTracker::default();
        assert!(p.set_milestone(3, true).unwrap());
        let after_first = p.clone();
        assert!(!p.set_milestone(3, true).unwrap());
        assert_eq!(p, after_first);
        assert_eq!(p.version(), 1);
    }

    #[test]
    fn set_milestone_can_clear_explicitly() {
        let mut p = ProgressTracker::default();
        p.set(Milestone::Preview, true);
        assert!(p.set_milestone(2, false).unwrap());
        assert!(!p.is_set(Milestone::Preview));
        assert_eq!(p.version(), 2);
    }

    #[test]
    fn out_of_range_index_is_an_error_in_development() {
        let mut p = ProgressTracker::new(ContractMode::Development);
        let err = p.set_milestone(5, true).unwrap_err();
        assert!(matches!(err, OnboardError::InvalidMilestoneIndex(5)));
        assert!(p.complete_milestone(9).is_err());
        assert_eq!(p.version(), 0);
    }

    #[test]
    fn out_of_range_index_is_ignored_in_production() {
        let mut p = ProgressTracker::new(ContractMode::Production);
        assert!(!p.set_milestone(5, true).unwrap());
        assert!(!p.complete_milestone(42).unwrap());
        assert_eq!(p.milestones(), &[false; MILESTONE_COUNT]);
        assert_eq!(p.version(), 0);
    }

    #[test]
    fn complete_advances_cursor_only_from_current_step() {
        let mut p = ProgressTracker::default();
        p.complete_milestone(2).unwrap();
        assert_eq!(p.current_step(), 0);
        p.complete_milestone(0).unwrap();
        assert_eq!(p.current_step(), 1);
        p.complete(Milestone::AdditionalServices);
        assert_eq!(p.current_step(), 2);
        p.complete(Milestone::Preview);
        assert_eq!(p.current_step(), 3);
    }

    #[test]
    fn active_step_is_first_incomplete() {
        let mut p = ProgressTracker::default();
        assert_eq!(p.get_active_step_index(), 0);
        p.set(Milestone::BasicDetails, true);
        p.set(Milestone::Preview, true);
        assert_eq!(p.get_active_step_index(), 1);
        assert_eq!(p.active_step(), Milestone::AdditionalServices);
    }

    #[test]
    fn active_step_clamps_when_all_complete() {
        let mut p = ProgressTracker::default();
        for m in Milestone::all() {
            p.complete(*m);
        }
        assert!(p.is_complete());
        assert_eq!(p.get_active_step_index(), MILESTONE_COUNT - 1);
        assert_eq!(p.current_step(), MILESTONE_COUNT);
    }

    #[test]
    fn reset_clears_everything_once() {
        let mut p = ProgressTracker::default();
        p.complete(Milestone::BasicDetails);
        p.complete(Milestone::AdditionalServices);
        let v = p.version();
        assert!(p.reset());
        assert_eq!(p.version(), v + 1);
        assert_eq!(p.current_step(), 0);
        assert!(!p.reset());
    }

    #[test]
    fn basic_details_requires_employee_count_and_service() {
        let mut form = basic_form();
        assert!(basic_details_complete(&form));

        form.set_field(FormField::EmployeeCount, "");
        assert!(!basic_details_complete(&form));

        let mut form = basic_form();
        form.deselect_service(1);
        assert!(!basic_details_complete(&form));

        let mut form = basic_form();
        form.set_field(FormField::Currency, "");
        assert!(!basic_details_complete(&form));
    }

    #[test]
    fn yet_to_begin_waives_employee_count() {
        let mut form = FormState::new();
        form.set_field(FormField::Responsibility, "Founder");
        form.set_field(FormField::BusinessCategory, "Retail");
        form.set_field(FormField::ValuationRange, VALUATION_YET_TO_BEGIN);
        form.set_field(FormField::Currency, "INR");
        assert!(!basic_details_complete(&form));
        form.select_service(3);
        assert!(basic_details_complete(&form));
        assert!(form.employee_count.is_none());
    }

    #[test]
    fn escape_valuation_waives_employees_and_services() {
        let mut form = FormState::new();
        form.set_field(FormField::Responsibility, "CFO");
        form.set_field(FormField::BusinessCategory, "Manufacturing");
        form.set_field(FormField::ValuationRange, VALUATION_ESCAPE);
        assert!(!basic_details_complete(&form));
        form.set_field(FormField::Currency, "USD");
        assert!(basic_details_complete(&form));
    }

    #[test]
    fn additional_services_needs_one_detail_per_selection() {
        let mut form = FormState::new();
        assert!(!additional_services_complete(&form));

        form.select_service(2);
        form.select_service(4);
        form.service_details = vec![ServiceDetail::new("Accounting")];
        assert!(!additional_services_complete(&form));

        form.service_details.push(ServiceDetail::new("Finance Operation Automation"));
        assert!(additional_services_complete(&form));

        form.service_details[0].service = String::new();
        assert!(!additional_services_complete(&form));
    }

    #[test]
    fn proposal_sent_mirrors_flag() {
        let mut form = FormState::new();
        let auth = AuthState::default();
        assert!(!derive_milestones(&form, &auth).proposal_sent);
        form.proposal_sent = true;
        assert!(derive_milestones(&form, &auth).proposal_sent);
    }

    #[test]
    fn derivation_is_total_on_empty_form() {
        let d = derive_milestones(&FormState::new(), &AuthState::default());
        assert!(!d.basic_details && !d.additional_services && !d.proposal_sent);
    }

    #[test]
    fn recompute_never_regresses() {
        let catalog = Catalog::standard();
        let auth = AuthState::default();
        let mut form = basic_form();
        form.refresh_service_details(catalog);

        let mut p = ProgressTracker::default();
        assert!(p.recompute_derived_milestones(&form, &auth));
        assert!(p.is_set(Milestone::BasicDetails));
        assert!(p.is_set(Milestone::AdditionalServices));

        form.set_field(FormField::Currency, "");
        form.deselect_service(1);
        form.refresh_service_details(catalog);
        assert!(!p.recompute_derived_milestones(&form, &auth));
        assert!(p.is_set(Milestone::BasicDetails));
        assert!(p.is_set(Milestone::AdditionalServices));
    }

    #[test]
    fn recompute_is_monotonic_as_form_grows() {
        let catalog = Catalog::standard();
        let auth = AuthState::default();
        let mut form = FormState::new();
        let mut p = ProgressTracker::default();
        let mut previous = *p.milestones();

        let steps: Vec<Box<dyn Fn(&mut FormState)>> = vec![
            Box::new(|f: &mut FormState| {
                f.set_field(FormField::Responsibility, "Founder");
            }),
            Box::new(|f: &mut FormState| {
                f.set_field(FormField::BusinessCategory, "Retail");
            }),
            Box::new(|f: &mut FormState| {
                f.set_field(FormField::ValuationRange, "1-5 Cr");
            }),
            Box::new(|f: &mut FormState| {
                f.set_field(FormField::Currency, "INR");
            }),
            Box::new(|f: &mut FormState| {
                f.set_field(FormField::EmployeeCount, "0-10");
            }),
            Box::new(|f: &mut FormState| {
                f.select_service(2);
            }),
            Box::new(|f: &mut FormState| f.set_selection_path(2, vec![1])),
            Box::new(|f: &mut FormState| f.set_selection_path(2, vec![1, 4])),
            Box::new(|f: &mut FormState| f.proposal_sent = true),
        ];

        for step in steps {
            step(&mut form);
            form.refresh_service_details(catalog);
            p.recompute_derived_milestones(&form, &auth);
            for (before, after) in previous.iter().zip(p.milestones()) {
                assert!(!before | after);
            }
            previous = *p.milestones();
        }
        assert!(p.is_set(Milestone::BasicDetails));
        assert!(p.is_set(Milestone::AdditionalServices));
        assert!(p.is_set(Milestone::ProposalSent));
        assert!(!p.is_set(Milestone::Preview));
    }

    #[test]
    fn serializes_without_mode() {
        let mut p = ProgressTracker::new(ContractMode::Production);
        p.complete(Milestone::BasicDetails);
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("mode"));
        let back: ProgressTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mode(), ContractMode::Development);
        assert_eq!(back.milestones(), p.milestones());
        assert_eq!(back.current_step(), 1);
    }
}
