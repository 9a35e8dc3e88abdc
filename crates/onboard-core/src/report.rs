use crate::catalog::Catalog;
use crate::detail::ServiceDetail;
use crate::notify::split_services;
use serde::Serialize;

const EMPTY_CELL: &str = "—";

/// One row of the proposal table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalRow {
    pub service: String,
    pub option: String,
    pub sub_option: String,
}

impl From<&ServiceDetail> for ProposalRow {
    fn from(d: &ServiceDetail) -> Self {
        let cell = |v: &Option<String>| v.clone().unwrap_or_else(|| EMPTY_CELL.to_string());
        Self {
            service: d.service.clone(),
            option: cell(&d.option),
            sub_option: cell(&d.sub_option),
        }
    }
}

pub fn proposal_rows(details: &[ServiceDetail]) -> Vec<ProposalRow> {
    details.iter().map(ProposalRow::from).collect()
}

/// A stored detail alongside its compact code, when still resolvable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodedDetail {
    pub code: Option<String>,
    pub labels: Vec<String>,
}

/// One user as shown on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub name: String,
    pub selected_services: Vec<String>,
    pub service_details: Vec<CodedDetail>,
}

impl ListingEntry {
    /// Build from the persisted columns: a comma-joined services string and
    /// the stored detail rows.
    pub fn from_stored(
        catalog: &Catalog,
        name: impl Into<String>,
        services_column: &str,
        details: &[ServiceDetail],
    ) -> Self {
        Self {
            name: name.into(),
            selected_services: split_services(services_column),
            service_details: details
                .iter()
                .map(|d| CodedDetail {
                    code: d.code(catalog),
                    labels: d.labels().into_iter().map(str::to_string).collect(),
                })
                .collect(),
        }
    }

    /// Build from a stored comma-joined column of compact codes, the form
    /// the user listing keeps. Codes that resolve to nothing are skipped.
    pub fn from_codes(
        catalog: &Catalog,
        name: impl Into<String>,
        services_column: &str,
        codes_column: &str,
    ) -> Self {
        let details: Vec<ServiceDetail> = split_services(codes_column)
            .iter()
            .filter_map(|code| ServiceDetail::from_code(catalog, code))
            .collect();
        Self::from_stored(catalog, name, services_column, &details)
    }

    /// Services whose label no longer appears in the catalog.
    pub fn retired_services(&self, catalog: &Catalog) -> Vec<&str> {
        self.selected_services
            .iter()
            .filter(|s| catalog.index_of(s).is_none())
            .map(String::as_str)
            .collect()
    }
}
