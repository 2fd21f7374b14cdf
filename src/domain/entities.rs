//! Domain entities: core data structures

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Position of a node in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One project variant the preprocessor maintains sources for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantNode {
    /// Project identifier, unique within a graph (e.g. "1.12.2")
    pub project: String,
    /// Numeric platform version tag (e.g. 11202)
    pub version: u32,
    /// Name of the mapping table the variant's sources are written against
    pub mappings: String,
}

impl VariantNode {
    pub fn new(project: impl Into<String>, version: u32, mappings: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            version,
            mappings: mappings.into(),
        }
    }
}

impl fmt::Display for VariantNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.project, self.version, self.mappings)
    }
}

/// Transformation attached to one direction of a link.
///
/// `inverted` is false when the edge is walked in the direction the link was
/// declared and true when it is walked backwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdgeDescriptor {
    /// Optional extra mapping overlay applied alongside the base mapping
    pub extra_mappings: Option<PathBuf>,
    pub inverted: bool,
}

impl EdgeDescriptor {
    pub fn new(extra_mappings: Option<PathBuf>, inverted: bool) -> Self {
        Self {
            extra_mappings,
            inverted,
        }
    }

    /// The same edge seen from the other endpoint.
    pub fn reversed(&self) -> Self {
        Self {
            extra_mappings: self.extra_mappings.clone(),
            inverted: !self.inverted,
        }
    }
}

impl fmt::Display for EdgeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.inverted { "<-" } else { "->" };
        match &self.extra_mappings {
            Some(path) => write!(f, "{} [{}]", arrow, path.display()),
            None => write!(f, "{}", arrow),
        }
    }
}

/// A declared link: `a` is the declaring side, `b` the linked side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub a: NodeId,
    pub b: NodeId,
    pub extra_mappings: Option<PathBuf>,
}

impl EdgeRecord {
    /// Descriptor and far endpoint as seen from `from`, if `from` is an endpoint.
    pub fn view_from(&self, from: NodeId) -> Option<(NodeId, EdgeDescriptor)> {
        if from == self.a {
            Some((self.b, EdgeDescriptor::new(self.extra_mappings.clone(), false)))
        } else if from == self.b {
            Some((self.a, EdgeDescriptor::new(self.extra_mappings.clone(), true)))
        } else {
            None
        }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// What to do when the requested main project is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootFallback {
    /// Use the first registered node as root
    #[default]
    FirstRegistered,
    /// Fail with `InvalidRootConfiguration`
    Reject,
}

impl FromStr for RootFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first-registered" => Ok(Self::FirstRegistered),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown root fallback '{}' (expected first-registered or reject)",
                other
            )),
        }
    }
}

impl fmt::Display for RootFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstRegistered => write!(f, "first-registered"),
            Self::Reject => write!(f, "reject"),
        }
    }
}
