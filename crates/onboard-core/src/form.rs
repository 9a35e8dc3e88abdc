use crate::catalog::Catalog;
use crate::detail::{resolve_service_detail, ServiceDetail};
use crate::error::{OnboardError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Valuation range for businesses that have not started trading; waives the
/// employee count.
pub const VALUATION_YET_TO_BEGIN: &str = "Yet to begin";

/// Valuation range that diverts to a separate contact flow; waives employee
/// count and service selection.
pub const VALUATION_ESCAPE: &str = "Above all of this";

pub const EMPLOYEE_COUNTS: &[&str] = &["0-10", "11-50", "51-200", "201-1000", "Above 1000"];

// ---------------------------------------------------------------------------
// FormField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Responsibility,
    BusinessCategory,
    ValuationRange,
    Currency,
    EmployeeCount,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Responsibility,
            FormField::BusinessCategory,
            FormField::ValuationRange,
            FormField::Currency,
            FormField::EmployeeCount,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Responsibility => "responsibility",
            FormField::BusinessCategory => "business_category",
            FormField::ValuationRange => "valuation_range",
            FormField::Currency => "currency",
            FormField::EmployeeCount => "employee_count",
        }
    }

    /// Fixed answer set for fields picked from a list; `None` for free text.
    pub fn choices(self) -> Option<&'static [&'static str]> {
        match self {
            FormField::EmployeeCount => Some(EMPLOYEE_COUNTS),
            _ => None,
        }
    }

    /// Reject a value outside the field's answer set. Blank always passes
    /// since it clears the field.
    pub fn check_value(self, value: &str) -> Result<()> {
        let value = value.trim();
        match self.choices() {
            Some(choices) if !value.is_empty() && !choices.contains(&value) => {
                Err(OnboardError::InvalidFieldValue {
                    field: self.as_str().to_string(),
                    value: value.to_string(),
                    expected: choices.join(", "),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormField {
    type Err = OnboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "responsibility" => Ok(FormField::Responsibility),
            "business_category" | "business-category" | "businessCategory" => {
                Ok(FormField::BusinessCategory)
            }
            "valuation_range" | "valuation-range" | "valuationRange" => {
                Ok(FormField::ValuationRange)
            }
            "currency" => Ok(FormField::Currency),
            "employee_count" | "employee-count" | "employeeCount" => Ok(FormField::EmployeeCount),
            _ => Err(OnboardError::UnknownField(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ContactDetails
// ---------------------------------------------------------------------------

pub const DEFAULT_COUNTRY_CODE: &str = "+91";

static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static COUNTRY_CODE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").unwrap())
}

fn country_code_re() -> &'static Regex {
    COUNTRY_CODE_RE.get_or_init(|| Regex::new(r"^\+[0-9]{1,4}$").unwrap())
}

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    pub phone: String,
    pub email: String,
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

impl ContactDetails {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            country_code: default_country_code(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = code.into();
        self
    }

    /// Checks are applied in the order the share-details screen reports them.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.phone.trim().is_empty() || self.email.trim().is_empty()
        {
            return Err(OnboardError::InvalidContact(
                "please fill all fields".to_string(),
            ));
        }
        if !phone_re().is_match(&self.phone) {
            return Err(OnboardError::InvalidContact(
                "phone number must be exactly 10 digits".to_string(),
            ));
        }
        if !country_code_re().is_match(&self.country_code) {
            return Err(OnboardError::InvalidContact(format!(
                "invalid country code '{}'",
                self.country_code
            )));
        }
        if !email_re().is_match(&self.email) {
            return Err(OnboardError::InvalidContact(format!(
                "invalid email address '{}'",
                self.email
            )));
        }
        Ok(())
    }

    pub fn full_phone(&self) -> String {
        format!("{}{}", self.country_code, self.phone)
    }
}

// ---------------------------------------------------------------------------
// AuthState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthState {
    pub fn signed_in(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: Some(email.into()),
        }
    }

    /// A user counts as authenticated once an email is known.
    pub fn is_authenticated(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// FormState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default)]
    pub responsibility: Option<String>,
    #[serde(default)]
    pub business_category: Option<String>,
    #[serde(default)]
    pub valuation_range: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub employee_count: Option<String>,
    /// 1-based service indices in first-selection order, no duplicates.
    #[serde(default)]
    pub selected_services: Vec<usize>,
    /// Per-service walk into the option tree, keyed by service index.
    #[serde(default)]
    pub selection_paths: BTreeMap<usize, Vec<usize>>,
    #[serde(default)]
    pub service_details: Vec<ServiceDetail>,
    #[serde(default)]
    pub proposal_sent: bool,
    #[serde(default)]
    pub contact: Option<ContactDetails>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: FormField) -> Option<&str> {
        let value = match field {
            FormField::Responsibility => &self.responsibility,
            FormField::BusinessCategory => &self.business_category,
            FormField::ValuationRange => &self.valuation_range,
            FormField::Currency => &self.currency,
            FormField::EmployeeCount => &self.employee_count,
        };
        value.as_deref()
    }

    /// True when the field holds a non-blank value.
    pub fn has(&self, field: FormField) -> bool {
        self.field(field).is_some_and(|v| !v.trim().is_empty())
    }

    /// Set a scalar field; a blank value clears it. Returns true on change.
    pub fn set_field(&mut self, field: FormField, value: &str) -> bool {
        let value = value.trim();
        let next = (!value.is_empty()).then(|| value.to_string());
        let slot = match field {
            FormField::Responsibility => &mut self.responsibility,
            FormField::BusinessCategory => &mut self.business_category,
            FormField::ValuationRange => &mut self.valuation_range,
            FormField::Currency => &mut self.currency,
            FormField::EmployeeCount => &mut self.employee_count,
        };
        if *slot == next {
            return false;
        }
        *slot = next;
        self.touch();
        true
    }

    pub fn is_escape_valuation(&self) -> bool {
        self.valuation_range.as_deref() == Some(VALUATION_ESCAPE)
    }

    pub fn is_yet_to_begin(&self) -> bool {
        self.valuation_range.as_deref() == Some(VALUATION_YET_TO_BEGIN)
    }

    /// Add a service to the ordered selection. Returns false if already selected.
    pub fn select_service(&mut self, index: usize) -> bool {
        if self.selected_services.contains(&index) {
            return false;
        }
        self.selected_services.push(index);
        self.touch();
        true
    }

    /// Remove a service and its selection path. Returns false if not selected.
    pub fn deselect_service(&mut self, index: usize) -> bool {
        let before = self.selected_services.len();
        self.selected_services.retain(|&i| i != index);
        if self.selected_services.len() == before {
            return false;
        }
        self.selection_paths.remove(&index);
        self.touch();
        true
    }

    pub fn set_selection_path(&mut self, index: usize, path: Vec<usize>) {
        self.selection_paths.insert(index, path);
        self.touch();
    }

    pub fn selection_path(&self, index: usize) -> &[usize] {
        self.selection_paths
            .get(&index)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Rebuild `service_details` in selection order from every selected
    /// service whose path resolves to a leaf.
    pub fn refresh_service_details(&mut self, catalog: &Catalog) {
        let details: Vec<ServiceDetail> = self
            .selected_services
            .iter()
            .filter_map(|&i| resolve_service_detail(catalog, i, self.selection_path(i)))
            .filter(|r| r.complete)
            .map(|r| r.detail)
            .collect();
        if details != self.service_details {
            self.service_details = details;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
