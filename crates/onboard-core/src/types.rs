use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Milestone
// ---------------------------------------------------------------------------

/// The five ordered onboarding milestones. The discriminant is the
/// authoritative position in the progress array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    BasicDetails = 0,
    AdditionalServices = 1,
    Preview = 2,
    ShareDetails = 3,
    ProposalSent = 4,
}

pub const MILESTONE_COUNT: usize = 5;

impl Milestone {
    pub fn all() -> &'static [Milestone] {
        &[
            Milestone::BasicDetails,
            Milestone::AdditionalServices,
            Milestone::Preview,
            Milestone::ShareDetails,
            Milestone::ProposalSent,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Milestone> {
        Milestone::all().get(index).copied()
    }

    pub fn next(self) -> Option<Milestone> {
        Milestone::from_index(self.index() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Milestone::BasicDetails => "basic_details",
            Milestone::AdditionalServices => "additional_services",
            Milestone::Preview => "preview",
            Milestone::ShareDetails => "share_details",
            Milestone::ProposalSent => "proposal_sent",
        }
    }

    /// Sidebar title shown to the user.
    pub fn title(self) -> &'static str {
        match self {
            Milestone::BasicDetails => "Basic Details",
            Milestone::AdditionalServices => "Additional Services",
            Milestone::Preview => "Preview",
            Milestone::ShareDetails => "Share Your Details",
            Milestone::ProposalSent => "Proposal",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Milestone {
    type Err = crate::error::OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic_details" | "basic-details" => Ok(Milestone::BasicDetails),
            "additional_services" | "additional-services" => Ok(Milestone::AdditionalServices),
            "preview" => Ok(Milestone::Preview),
            "share_details" | "share-details" => Ok(Milestone::ShareDetails),
            "proposal_sent" | "proposal-sent" => Ok(Milestone::ProposalSent),
            _ => {
                if let Ok(i) = s.parse::<usize>() {
                    if let Some(m) = Milestone::from_index(i) {
                        return Ok(m);
                    }
                }
                Err(crate::error::OnboardError::InvalidMilestone(s.to_string()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ContractMode
// ---------------------------------------------------------------------------

/// How contract violations (e.g. an out-of-range milestone index) are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractMode {
    /// Violations surface as errors.
    #[default]
    Development,
    /// Violations are logged and ignored.
    Production,
}

impl fmt::Display for ContractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContractMode::Development => "development",
            ContractMode::Production => "production",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ContractMode {
    type Err = crate::error::OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(ContractMode::Development),
            "production" | "prod" => Ok(ContractMode::Production),
            _ => Err(crate::error::OnboardError::InvalidMode(s.to_string())),
        }
    }
}
