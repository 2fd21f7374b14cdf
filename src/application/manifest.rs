//! Declarative graph manifest
//!
//! A manifest is the configuration a host evaluates to populate the project
//! graph: either a set of nodes and links from which the tree is derived, or an
//! explicitly declared tree under `[root]`.
//!
//! ```toml
//! main_project = "1.12.2"
//!
//! [[nodes]]
//! project = "1.12.2"
//! version = 11202
//! mappings = "srg"
//!
//! [[nodes]]
//! project = "1.8.9"
//! version = 10809
//! mappings = "srg"
//!
//! [[links]]
//! from = "1.12.2"
//! to = "1.8.9"
//! extra_mappings = "mapping-1.12.2-1.8.9.txt"
//! ```

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GraphManifest {
    pub main_project: Option<String>,
    /// File whose trimmed content names the main project
    pub main_project_file: Option<PathBuf>,
    /// Overrides `Settings::strict_extra_mappings` when set
    pub strict_extra_mappings: Option<bool>,
    pub nodes: Vec<NodeEntry>,
    pub links: Vec<LinkEntry>,
    pub root: Option<DeclaredNode>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub project: String,
    pub version: u32,
    pub mappings: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LinkEntry {
    pub from: String,
    pub to: String,
    pub extra_mappings: Option<PathBuf>,
}

/// Node of an explicitly declared tree.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeclaredNode {
    pub project: String,
    pub version: u32,
    pub mappings: String,
    pub extra_mappings: Option<PathBuf>,
    #[serde(default)]
    pub inverted: bool,
    #[serde(default)]
    pub children: Vec<DeclaredNode>,
}
