//! Project graph service
//!
//! Owns the graph for one build invocation. The graph starts out accepting
//! node and link declarations and turns, once, into an immutable rooted tree.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    DomainError, EdgeDescriptor, GraphRegistry, NodeId, ProjectTree, RootFallback, TreeBuilder,
    TreeIndex, VariantNode,
};

/// Result of the Unbuilt -> Built transition.
#[derive(Debug)]
pub struct BuiltGraph {
    main_project: String,
    tree: Option<ProjectTree>,
    unreachable: Vec<VariantNode>,
}

impl BuiltGraph {
    /// Main project the tree was requested for.
    pub fn main_project(&self) -> &str {
        &self.main_project
    }

    /// The rooted tree, None if nothing was declared.
    pub fn tree(&self) -> Option<&ProjectTree> {
        self.tree.as_ref()
    }

    /// Registered nodes that are not part of the tree.
    pub fn unreachable(&self) -> &[VariantNode] {
        &self.unreachable
    }
}

#[derive(Debug, Default)]
struct PendingGraph {
    registry: GraphRegistry,
    /// Explicitly declared tree; takes precedence over the registry
    declared: Option<ProjectTree>,
}

impl PendingGraph {
    fn resolve(&mut self, main_project: &str, fallback: RootFallback) -> ApplicationResult<BuiltGraph> {
        let tree = match self.declared.take() {
            Some(tree) => {
                if let Some(root) = tree.root_node() {
                    if root.data.project != main_project {
                        warn!(
                            "declared root {} differs from main project {}",
                            root.data.project, main_project
                        );
                    }
                }
                Some(tree)
            }
            None => TreeBuilder::new(&self.registry)
                .with_fallback(fallback)
                .build(main_project)?,
        };

        let unreachable = self.unreachable_from(tree.as_ref());
        for node in &unreachable {
            warn!("{} is not part of the tree and will not be preprocessed", node.project);
        }

        Ok(BuiltGraph {
            main_project: main_project.to_string(),
            tree,
            unreachable,
        })
    }

    /// Registered nodes the tree does not contain, in registration order.
    fn unreachable_from(&self, tree: Option<&ProjectTree>) -> Vec<VariantNode> {
        let reached: HashSet<&str> = tree
            .into_iter()
            .flat_map(|t| t.iter())
            .map(|(_, node)| node.data.project.as_str())
            .collect();
        self.registry
            .nodes()
            .filter(|(_, node)| !reached.contains(node.project.as_str()))
            .map(|(_, node)| node.clone())
            .collect()
    }
}

/// Service holding the project graph of one build invocation.
///
/// Unbuilt while `built` is None: declarations go to `pending`. The first
/// build moves the pending declarations into the immutable `BuiltGraph`.
#[derive(Debug)]
pub struct PreprocessGraph {
    fallback: RootFallback,
    pending: PendingGraph,
    built: Option<BuiltGraph>,
}

impl Default for PreprocessGraph {
    fn default() -> Self {
        Self::new(RootFallback::default())
    }
}

impl PreprocessGraph {
    pub fn new(fallback: RootFallback) -> Self {
        Self {
            fallback,
            pending: PendingGraph::default(),
            built: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Registry while the graph is still accepting declarations.
    pub fn registry(&self) -> Option<&GraphRegistry> {
        match self.built {
            Some(_) => None,
            None => Some(&self.pending.registry),
        }
    }

    /// The built graph, if the transition already happened.
    pub fn built(&self) -> Option<&BuiltGraph> {
        self.built.as_ref()
    }

    pub fn create_node(&mut self, project: &str, version: u32, mappings: &str) -> ApplicationResult<NodeId> {
        let pending = self.pending_mut("create node")?;
        Ok(pending.registry.create_node(project, version, mappings)?)
    }

    pub fn link(&mut self, a: NodeId, b: NodeId, extra_mappings: Option<PathBuf>) -> ApplicationResult<()> {
        let pending = self.pending_mut("link nodes")?;
        Ok(pending.registry.link(a, b, extra_mappings)?)
    }

    pub fn link_projects(&mut self, a: &str, b: &str, extra_mappings: Option<PathBuf>) -> ApplicationResult<()> {
        let pending = self.pending_mut("link nodes")?;
        Ok(pending.registry.link_projects(a, b, extra_mappings)?)
    }

    /// Declare the root of an explicit tree instead of deriving one from links.
    #[instrument(level = "debug", skip(self))]
    pub fn declare_root(
        &mut self,
        project: &str,
        version: u32,
        mappings: &str,
        extra_mappings: Option<PathBuf>,
    ) -> ApplicationResult<TreeIndex> {
        let pending = self.pending_mut("declare root")?;
        if let Some(existing) = pending.declared.as_ref().and_then(|t| t.root_node()) {
            return Err(DomainError::RootAlreadyDeclared(existing.data.project.clone()).into());
        }
        if extra_mappings.is_some() {
            return Err(DomainError::RootExtraMappings(project.to_string()).into());
        }

        let mut tree = ProjectTree::new();
        let root = tree
            .insert_node(VariantNode::new(project, version, mappings), None)
            .ok_or_else(|| DomainError::InvalidTreeIndex("root".to_string()))?;
        pending.declared = Some(tree);
        debug!("declared root {}", project);
        Ok(root)
    }

    /// Attach a child below a declared node with an explicit direction.
    #[instrument(level = "debug", skip(self))]
    pub fn declare_child(
        &mut self,
        parent: TreeIndex,
        project: &str,
        version: u32,
        mappings: &str,
        extra_mappings: Option<PathBuf>,
        inverted: bool,
    ) -> ApplicationResult<TreeIndex> {
        let pending = self.pending_mut("declare node")?;
        let tree = pending
            .declared
            .as_mut()
            .ok_or_else(|| DomainError::InvalidTreeIndex(format!("{:?}", parent)))?;
        if tree.find_node(project).is_some() {
            return Err(DomainError::DuplicateNode(project.to_string()).into());
        }

        let edge = EdgeDescriptor::new(extra_mappings, inverted);
        let child = tree
            .insert_node(VariantNode::new(project, version, mappings), Some((parent, edge)))
            .ok_or_else(|| DomainError::InvalidTreeIndex(format!("{:?}", parent)))?;
        Ok(child)
    }

    /// Build the graph for `main_project`, or return the graph built earlier.
    ///
    /// Only the first call builds. Later calls return the same snapshot even
    /// when they ask for a different main project. A failed build leaves the
    /// graph unbuilt.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&mut self, main_project: &str) -> ApplicationResult<&BuiltGraph> {
        let built = match self.built.take() {
            Some(built) => {
                if built.main_project != main_project {
                    warn!(
                        "graph already built for {}, ignoring request for {}",
                        built.main_project, main_project
                    );
                }
                built
            }
            None => {
                let built = self.pending.resolve(main_project, self.fallback)?;
                self.pending = PendingGraph::default();
                built
            }
        };
        let built: &BuiltGraph = self.built.insert(built);
        Ok(built)
    }

    /// Rooted tree for `main_project`; None if no nodes were declared.
    pub fn root_node(&mut self, main_project: &str) -> ApplicationResult<Option<&ProjectTree>> {
        Ok(self.build(main_project)?.tree())
    }

    fn pending_mut(&mut self, operation: &str) -> ApplicationResult<&mut PendingGraph> {
        match self.built {
            Some(_) => Err(ApplicationError::GraphAlreadyBuilt(operation.to_string())),
            None => Ok(&mut self.pending),
        }
    }
}
