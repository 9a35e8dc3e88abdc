use crate::catalog::Catalog;
use crate::codec;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ServiceDetail
// ---------------------------------------------------------------------------

/// Resolved, human-readable record of one selected service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetail {
    pub service: String,
    #[serde(default)]
    pub option: Option<String>,
    #[serde(default)]
    pub sub_option: Option<String>,
}

impl ServiceDetail {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            option: None,
            sub_option: None,
        }
    }

    /// Read a stored compact code back into a detail. Decoding keeps the
    /// longest resolvable prefix; `None` when not even the service resolves.
    /// Levels below the sub-option fold into `sub_option`.
    pub fn from_code(catalog: &Catalog, code: &str) -> Option<Self> {
        let mut labels = codec::decode(catalog, code).into_labels().into_iter();
        let mut detail = Self::new(labels.next()?);
        detail.option = labels.next();
        detail.sub_option = labels.last();
        Some(detail)
    }

    /// Recover the compact code from the stored labels. `None` when the
    /// service label is no longer in the catalog; stops at the first
    /// label that no longer resolves.
    pub fn code(&self, catalog: &Catalog) -> Option<String> {
        let index = catalog.index_of(&self.service)?;
        let mut node = catalog.get_catalog_entry(index)?;
        let mut path = Vec::new();
        for label in [&self.option, &self.sub_option].into_iter().flatten() {
            let Some(pos) = node.children().iter().position(|c| c.label() == label) else {
                break;
            };
            path.push(pos);
            node = &node.children()[pos];
        }
        Some(codec::encode(catalog, index, &path).code)
    }

    /// Display labels in order, skipping unset levels.
    pub fn labels(&self) -> Vec<&str> {
        std::iter::once(self.service.as_str())
            .chain(self.option.as_deref())
            .chain(self.sub_option.as_deref())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub detail: ServiceDetail,
    /// True when the walk ended on a node with no further options. Entries
    /// past the first out-of-range index are ignored.
    pub complete: bool,
}

/// Resolve a selection path into a structured detail. `None` only when the
/// service index is not in the catalog.
pub fn resolve_service_detail(
    catalog: &Catalog,
    service_index: usize,
    path: &[usize],
) -> Option<Resolution> {
    let service = catalog.get_catalog_entry(service_index)?;
    let mut detail = ServiceDetail::new(service.label());

    if service.is_leaf() {
        return Some(Resolution {
            detail,
            complete: true,
        });
    }

    let mut node = service;
    for (level, &i) in path.iter().enumerate() {
        let Some(child) = node.child(i) else {
            break;
        };
        match level {
            0 => detail.option = Some(child.label().to_string()),
            1 => detail.sub_option = Some(child.label().to_string()),
            _ => {}
        }
        node = child;
    }

    Some(Resolution {
        detail,
        complete: node.is_leaf(),
    })
}
