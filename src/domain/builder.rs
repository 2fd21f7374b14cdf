//! Tree builder: turns the undirected link graph into a rooted project tree.

use std::collections::VecDeque;

use tracing::{debug, info, instrument};

use crate::domain::arena::ProjectTree;
use crate::domain::entities::{NodeId, RootFallback, VariantNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::registry::GraphRegistry;

/// Result type for tree operations.
pub type TreeResult<T> = DomainResult<T>;

/// Constructs the rooted tree from a registry snapshot.
pub struct TreeBuilder<'a> {
    registry: &'a GraphRegistry,
    fallback: RootFallback,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(registry: &'a GraphRegistry) -> Self {
        Self {
            registry,
            fallback: RootFallback::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: RootFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Build the tree rooted at `main_project`.
    ///
    /// Returns None for an empty registry. Nodes that cannot be reached from
    /// the root are left out.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self, main_project: &str) -> TreeResult<Option<ProjectTree>> {
        let Some(root) = self.select_root(main_project)? else {
            debug!("registry is empty, nothing to build");
            return Ok(None);
        };
        Ok(Some(self.build_tree(root)?))
    }

    #[instrument(level = "debug", skip(self))]
    fn select_root(&self, main_project: &str) -> TreeResult<Option<NodeId>> {
        let Some((first, _)) = self.registry.nodes().next() else {
            return Ok(None);
        };

        let root = match self.registry.find(main_project) {
            Some(id) => id,
            None => match self.fallback {
                RootFallback::FirstRegistered => {
                    debug!(
                        "main project {} not registered, falling back to first node",
                        main_project
                    );
                    first
                }
                RootFallback::Reject => {
                    return Err(DomainError::InvalidRootConfiguration {
                        main: main_project.to_string(),
                    })
                }
            },
        };

        if let Some(node) = self.registry.node(root) {
            info!("root node: {}", node.project);
        }
        Ok(Some(root))
    }

    #[instrument(level = "debug", skip(self))]
    fn build_tree(&self, root: NodeId) -> TreeResult<ProjectTree> {
        let mut tree = ProjectTree::new();
        let mut visited = vec![false; self.registry.len()];
        let mut queue = VecDeque::new();

        let root_data = self.node_data(root)?;
        let root_idx = tree
            .insert_node(root_data, None)
            .ok_or_else(|| DomainError::InvalidTreeIndex("root".to_string()))?;
        visited[root.index()] = true;
        queue.push_back((root, root_idx));

        while let Some((current, current_idx)) = queue.pop_front() {
            for (neighbor, edge) in self.registry.neighbors(current) {
                // First discovery wins; later edges into visited nodes are dropped
                if visited[neighbor.index()] {
                    continue;
                }
                visited[neighbor.index()] = true;

                let data = self.node_data(neighbor)?;
                debug!("attach {} below {:?}", data.project, current_idx);
                let child_idx = tree
                    .insert_node(data, Some((current_idx, edge)))
                    .ok_or_else(|| DomainError::InvalidTreeIndex(format!("{:?}", current_idx)))?;
                queue.push_back((neighbor, child_idx));
            }
        }

        Ok(tree)
    }

    fn node_data(&self, id: NodeId) -> TreeResult<VariantNode> {
        self.registry
            .node(id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownNode(format!("#{}", id.index())))
    }
}
