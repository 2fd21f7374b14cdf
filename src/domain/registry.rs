//! Graph registry: declared variants and the undirected links between them.
//!
//! Links are stored once, as an edge set. Each node keeps an incidence list of
//! edge ids so adjacency views can be computed without a mirrored second map.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::domain::entities::{EdgeDescriptor, EdgeRecord, NodeId, VariantNode};
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Default)]
pub struct GraphRegistry {
    /// Nodes in registration order
    nodes: Vec<VariantNode>,
    by_project: HashMap<String, NodeId>,
    edges: Vec<EdgeRecord>,
    /// Per node: ids of incident edges in link order
    incidence: Vec<Vec<usize>>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant. Identifiers must be unique.
    #[instrument(level = "debug", skip_all, fields(project = project.as_ref()))]
    pub fn create_node(
        &mut self,
        project: impl AsRef<str>,
        version: u32,
        mappings: impl AsRef<str>,
    ) -> DomainResult<NodeId> {
        let project = project.as_ref();
        if self.by_project.contains_key(project) {
            return Err(DomainError::DuplicateNode(project.to_string()));
        }

        let id = NodeId(self.nodes.len());
        self.nodes
            .push(VariantNode::new(project, version, mappings.as_ref()));
        self.by_project.insert(project.to_string(), id);
        self.incidence.push(Vec::new());
        debug!("registered {} as node {}", project, id.0);
        Ok(id)
    }

    /// Link `a` to `b`. Walking from `a` to `b` is the forward direction.
    ///
    /// Repeating an identical declaration is a no-op. Any other declaration for
    /// an already linked pair, including the reverse one, is a conflict.
    #[instrument(level = "debug", skip(self))]
    pub fn link(&mut self, a: NodeId, b: NodeId, extra_mappings: Option<PathBuf>) -> DomainResult<()> {
        let a_name = self.project_name(a)?.to_string();
        let b_name = self.project_name(b)?.to_string();
        if a == b {
            return Err(DomainError::SelfLink(a_name));
        }

        if let Some(existing) = self.edge_between(a, b) {
            if existing.a == a && existing.extra_mappings == extra_mappings {
                debug!("link {} -> {} already declared", a_name, b_name);
                return Ok(());
            }
            let reason = if existing.a != a {
                format!("already declared as {} -> {}", b_name, a_name)
            } else {
                format!(
                    "already declared with extra mappings {:?}",
                    existing.extra_mappings
                )
            };
            return Err(DomainError::ConflictingEdge {
                a: a_name,
                b: b_name,
                reason,
            });
        }

        let edge_id = self.edges.len();
        self.edges.push(EdgeRecord {
            a,
            b,
            extra_mappings,
        });
        self.incidence[a.0].push(edge_id);
        self.incidence[b.0].push(edge_id);
        debug!("linked {} -> {}", a_name, b_name);
        Ok(())
    }

    /// Link two nodes by identifier.
    pub fn link_projects(&mut self, a: &str, b: &str, extra_mappings: Option<PathBuf>) -> DomainResult<()> {
        let a = self
            .find(a)
            .ok_or_else(|| DomainError::UnknownNode(a.to_string()))?;
        let b = self
            .find(b)
            .ok_or_else(|| DomainError::UnknownNode(b.to_string()))?;
        self.link(a, b, extra_mappings)
    }

    /// Neighbors of `id` with the descriptor for walking towards each of them,
    /// in the order the links were declared.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, EdgeDescriptor)> + '_ {
        self.incidence
            .get(id.0)
            .into_iter()
            .flatten()
            .filter_map(move |&edge_id| self.edges[edge_id].view_from(id))
    }

    pub fn find(&self, project: &str) -> Option<NodeId> {
        self.by_project.get(project).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&VariantNode> {
        self.nodes.get(id.0)
    }

    /// Nodes with their ids, in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &VariantNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn project_name(&self, id: NodeId) -> DomainResult<&str> {
        self.nodes
            .get(id.0)
            .map(|n| n.project.as_str())
            .ok_or_else(|| DomainError::UnknownNode(format!("#{}", id.0)))
    }

    fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&EdgeRecord> {
        self.incidence[a.0]
            .iter()
            .map(|&edge_id| &self.edges[edge_id])
            .find(|edge| edge.connects(a, b))
    }
}
