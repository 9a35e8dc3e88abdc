use crate::error::{OnboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Number of letters available for first-level option tokens.
pub const MAX_FIRST_LEVEL_OPTIONS: usize = 26;

/// Sibling lists at level 2 and deeper with this many entries or more must
/// consist of leaves only; otherwise numeric tokens become ambiguous.
pub const NUMERIC_BRANCH_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// ServiceNode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceNode {
    Leaf {
        label: String,
        code: String,
    },
    Branch {
        label: String,
        code: String,
        children: Vec<ServiceNode>,
    },
}

impl ServiceNode {
    pub fn label(&self) -> &str {
        match self {
            ServiceNode::Leaf { label, .. } | ServiceNode::Branch { label, .. } => label,
        }
    }

    /// Token contributed by this node to a composite code.
    pub fn code(&self) -> &str {
        match self {
            ServiceNode::Leaf { code, .. } | ServiceNode::Branch { code, .. } => code,
        }
    }

    pub fn children(&self) -> &[ServiceNode] {
        match self {
            ServiceNode::Leaf { .. } => &[],
            ServiceNode::Branch { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ServiceNode::Leaf { .. })
    }

    pub fn child(&self, index: usize) -> Option<&ServiceNode> {
        self.children().get(index)
    }

    /// Walk `path` below this node. `None` as soon as an index is out of range.
    pub fn descend(&self, path: &[usize]) -> Option<&ServiceNode> {
        path.iter().try_fold(self, |node, &i| node.child(i))
    }
}

/// Token for the node at `position` (0-based) among its siblings at `level`.
/// Level 0 is the top-level service list.
pub fn level_token(level: usize, position: usize) -> String {
    match level {
        1 => char::from(b'a' + (position % MAX_FIRST_LEVEL_OPTIONS) as u8).to_string(),
        _ => (position + 1).to_string(),
    }
}

// ---------------------------------------------------------------------------
// CatalogSpec (input shape)
// ---------------------------------------------------------------------------

/// Serde shape for authoring a catalog in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CatalogSpec>,
}

impl CatalogSpec {
    pub fn leaf(label: &str) -> Self {
        Self {
            label: label.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: &str, children: Vec<CatalogSpec>) -> Self {
        Self {
            label: label.to_string(),
            children,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable, ordered forest of services. One root per top-level service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    services: Vec<ServiceNode>,
}

impl Catalog {
    /// Build and validate a catalog from its authored shape.
    pub fn from_spec(specs: Vec<CatalogSpec>) -> Result<Self> {
        validate_siblings(&specs, 0)?;
        Ok(Self::build(specs))
    }

    fn build(specs: Vec<CatalogSpec>) -> Self {
        Self {
            services: build_nodes(specs, 0),
        }
    }

    /// The built-in service catalog.
    pub fn standard() -> &'static Catalog {
        static STANDARD: OnceLock<Catalog> = OnceLock::new();
        STANDARD.get_or_init(|| Catalog::build(standard_spec()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let specs: Vec<CatalogSpec> = serde_yaml::from_str(&data)?;
        Self::from_spec(specs)
    }

    /// Load the override at `path` when it exists, otherwise the built-in catalog.
    pub fn load_or_standard(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::standard().clone())
        }
    }

    pub fn services(&self) -> &[ServiceNode] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Top-level entry by 1-based index.
    pub fn get_catalog_entry(&self, index: usize) -> Option<&ServiceNode> {
        index.checked_sub(1).and_then(|i| self.services.get(i))
    }

    /// Children reached by walking `path` below `entry`.
    pub fn get_children<'a>(
        &self,
        entry: &'a ServiceNode,
        path: &[usize],
    ) -> Option<&'a [ServiceNode]> {
        entry.descend(path).map(ServiceNode::children)
    }

    pub fn node_at(&self, index: usize, path: &[usize]) -> Option<&ServiceNode> {
        self.get_catalog_entry(index)?.descend(path)
    }

    /// Labels along `path` starting with the service label, by direct traversal.
    /// `None` when the service or any path entry is out of range.
    pub fn labels(&self, index: usize, path: &[usize]) -> Option<Vec<String>> {
        let mut node = self.get_catalog_entry(index)?;
        let mut labels = vec![node.label().to_string()];
        for &i in path {
            node = node.child(i)?;
            labels.push(node.label().to_string());
        }
        Some(labels)
    }

    /// 1-based index of the service with `label`.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.services
            .iter()
            .position(|s| s.label() == label)
            .map(|i| i + 1)
    }

    pub fn labels_for(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&i| self.get_catalog_entry(i))
            .map(|s| s.label().to_string())
            .collect()
    }
}

fn build_nodes(specs: Vec<CatalogSpec>, level: usize) -> Vec<ServiceNode> {
    specs
        .into_iter()
        .enumerate()
        .map(|(position, spec)| {
            let code = level_token(level, position);
            if spec.children.is_empty() {
                ServiceNode::Leaf {
                    label: spec.label,
                    code,
                }
            } else {
                ServiceNode::Branch {
                    label: spec.label,
                    code,
                    children: build_nodes(spec.children, level + 1),
                }
            }
        })
        .collect()
}

fn validate_siblings(specs: &[CatalogSpec], level: usize) -> Result<()> {
    if level == 0 && specs.is_empty() {
        return Err(OnboardError::InvalidCatalog(
            "catalog has no services".to_string(),
        ));
    }
    if level == 1 && specs.len() > MAX_FIRST_LEVEL_OPTIONS {
        return Err(OnboardError::InvalidCatalog(format!(
            "'{}' and {} more: at most {MAX_FIRST_LEVEL_OPTIONS} first-level options",
            specs[0].label,
            specs.len() - 1
        )));
    }

    let mut seen = HashSet::new();
    for spec in specs {
        let label = spec.label.trim();
        if label.is_empty() {
            return Err(OnboardError::InvalidCatalog(format!(
                "empty label at level {level}"
            )));
        }
        if !seen.insert(label) {
            return Err(OnboardError::InvalidCatalog(format!(
                "duplicate label '{label}' at level {level}"
            )));
        }
        if level >= 2 && specs.len() >= NUMERIC_BRANCH_LIMIT && !spec.children.is_empty() {
            return Err(OnboardError::InvalidCatalog(format!(
                "'{label}' has options but sits among {} siblings at level {level}",
                specs.len()
            )));
        }
        validate_siblings(&spec.children, level + 1)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

const SUPPORT_LEVELS: [&str; 3] = [
    "End-to-end support",
    "Need additional dedicated resources",
    "Only review function",
];

fn support_levels() -> Vec<CatalogSpec> {
    SUPPORT_LEVELS.iter().map(|l| CatalogSpec::leaf(l)).collect()
}

fn leaves(labels: &[&str]) -> Vec<CatalogSpec> {
    labels.iter().map(|l| CatalogSpec::leaf(l)).collect()
}

pub fn standard_spec() -> Vec<CatalogSpec> {
    vec![
        CatalogSpec::leaf("Zoho"),
        CatalogSpec::branch(
            "Finance Operation Automation",
            vec![
                CatalogSpec::leaf("DPA"),
                CatalogSpec::branch(
                    "CFO Stack – ITeC App",
                    leaves(&[
                        "Financial Audit Readiness",
                        "Automation",
                        "Financial Due Diligence",
                        "Procure to Pay Automation",
                        "Litigation Tracker",
                        "Finance Project Management",
                        "Accounting, Payroll & Compliance",
                    ]),
                ),
            ],
        ),
        CatalogSpec::branch("Payroll", support_levels()),
        CatalogSpec::branch("Accounting", support_levels()),
        CatalogSpec::branch("Compliances", support_levels()),
        CatalogSpec::branch(
            "Advisory Services",
            leaves(&[
                "Due Diligence",
                "Transfer Pricing",
                "Other Advisory",
                "Valuation",
                "Fund Raise",
                "Process Setup & Review",
                "Family Settlement",
                "IFC Testing / Internal Audit",
                "Mergers & Acquisitions",
                "ESOP Structuring",
                "Schedule a discovery call",
            ]),
        ),
        CatalogSpec::leaf("Start a Business"),
        CatalogSpec::leaf("Hire a CFO"),
        CatalogSpec::leaf("Audit Support"),
        CatalogSpec::leaf("People Augmentation"),
        CatalogSpec::leaf("HR Support"),
        CatalogSpec::leaf("Customer Support"),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
