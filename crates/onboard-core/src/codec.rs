//! Compact selection codes.
//!
//! A code is the decimal 1-based service index, then one lowercase letter for
//! the first option level, then a 1-based decimal per deeper level, with no
//! separators: `"2b2"` is service 2, option `b`, its second sub-option.
//!
//! Neither direction fails. Encoding an out-of-range path yields the code of
//! the deepest valid prefix; decoding malformed input yields the longest
//! valid label prefix and reports where it stopped.

use crate::catalog::{Catalog, ServiceNode};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub code: String,
    /// Number of path entries that made it into the code.
    pub depth: usize,
    /// True when the service index or some path entry was out of range.
    pub truncated: bool,
}

pub fn encode(catalog: &Catalog, service_index: usize, path: &[usize]) -> Encoded {
    let Some(mut node) = catalog.get_catalog_entry(service_index) else {
        return Encoded {
            code: String::new(),
            depth: 0,
            truncated: true,
        };
    };

    let mut code = node.code().to_string();
    for (depth, &i) in path.iter().enumerate() {
        match node.child(i) {
            Some(child) => {
                code.push_str(child.code());
                node = child;
            }
            None => {
                return Encoded {
                    code,
                    depth,
                    truncated: true,
                }
            }
        }
    }

    Encoded {
        code,
        depth: path.len(),
        truncated: false,
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Why decoding stopped before consuming the whole code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DecodeStop {
    Empty,
    MissingServiceIndex,
    UnknownService { token: String },
    /// The token at byte `offset` does not name a child of the current node.
    InvalidToken { offset: usize },
    /// Characters remain at `offset` but the current node is a leaf.
    ChildrenExhausted { offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<DecodeStop>,
}

impl Decoded {
    fn stopped(labels: Vec<String>, stop: DecodeStop) -> Self {
        Self {
            labels,
            stop: Some(stop),
        }
    }

    /// True when every character of the code resolved.
    pub fn is_complete(&self) -> bool {
        self.stop.is_none()
    }

    pub fn into_labels(self) -> Vec<String> {
        self.labels
    }
}

pub fn decode(catalog: &Catalog, code: &str) -> Decoded {
    let code = code.trim();
    if code.is_empty() {
        return Decoded::stopped(Vec::new(), DecodeStop::Empty);
    }

    let digits_end = leading_digits(code);
    if digits_end == 0 {
        return Decoded::stopped(Vec::new(), DecodeStop::MissingServiceIndex);
    }
    let token = &code[..digits_end];
    let Some(mut node) = token
        .parse::<usize>()
        .ok()
        .and_then(|i| catalog.get_catalog_entry(i))
    else {
        return Decoded::stopped(
            Vec::new(),
            DecodeStop::UnknownService {
                token: token.to_string(),
            },
        );
    };

    let mut labels = vec![node.label().to_string()];
    let mut offset = digits_end;
    let mut level = 1;

    while offset < code.len() {
        if node.is_leaf() {
            return Decoded::stopped(labels, DecodeStop::ChildrenExhausted { offset });
        }
        let rest = &code[offset..];
        let step = if level == 1 {
            letter_token(node, rest)
        } else {
            numeric_token(node, rest)
        };
        let Some((child, consumed)) = step else {
            return Decoded::stopped(labels, DecodeStop::InvalidToken { offset });
        };
        labels.push(child.label().to_string());
        node = child;
        offset += consumed;
        level += 1;
    }

    Decoded { labels, stop: None }
}

/// Labels only; an unresolvable code yields the longest valid prefix.
pub fn decode_labels(catalog: &Catalog, code: &str) -> Vec<String> {
    decode(catalog, code).into_labels()
}

fn leading_digits(s: &str) -> usize {
    s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())
}

fn letter_token<'a>(node: &'a ServiceNode, rest: &str) -> Option<(&'a ServiceNode, usize)> {
    let c = rest.chars().next()?;
    if !c.is_ascii_lowercase() {
        return None;
    }
    let index = (c as u8 - b'a') as usize;
    node.child(index).map(|child| (child, 1))
}

/// The whole decimal run names a 1-based child. A shorter prefix is only
/// accepted when it names a branch, so the remaining digits belong to the
/// next level. Leading zeros never match.
fn numeric_token<'a>(node: &'a ServiceNode, rest: &str) -> Option<(&'a ServiceNode, usize)> {
    if rest.starts_with('0') {
        return None;
    }
    let run = leading_digits(rest);
    (1..=run).rev().find_map(|len| {
        let position = rest[..len].parse::<usize>().ok()?;
        let child = node.child(position.checked_sub(1)?)?;
        (len == run || !child.is_leaf()).then_some((child, len))
    })
}
