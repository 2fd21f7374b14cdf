use std::sync::atomic::{AtomicUsize, Ordering};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{EdgeDescriptor, VariantNode};

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

/// Handle to a node of one particular `ProjectTree`.
///
/// Arena indices are only unique within their arena, so the handle also
/// carries the id of the tree that issued it. Handles from another tree never
/// resolve, even when their slot and generation match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeIndex {
    tree: usize,
    idx: Index,
}

/// Outgoing edge from a parent to one of its children.
#[derive(Debug, Clone)]
pub struct ChildLink {
    pub child: TreeIndex,
    /// Transformation seen from the parent towards the child
    pub edge: EdgeDescriptor,
}

/// Tree node in the arena-based project tree.
///
/// There is no parent pointer; parent lookup is a query on the tree.
#[derive(Debug)]
pub struct TreeNode {
    pub data: VariantNode,
    /// Children in discovery order
    pub children: Vec<ChildLink>,
}

/// Rooted tree of project variants.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Once handed out by the builder the tree is only read.
#[derive(Debug)]
pub struct ProjectTree {
    id: usize,
    arena: Arena<TreeNode>,
    root: Option<TreeIndex>,
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectTree {
    pub fn new() -> Self {
        Self {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            arena: Arena::new(),
            root: None,
        }
    }

    /// Whether `idx` was issued by this tree and still refers to a node.
    pub fn contains(&self, idx: TreeIndex) -> bool {
        idx.tree == self.id && self.arena.contains(idx.idx)
    }

    /// Insert a node below `parent`, or as the root when `parent` is None.
    ///
    /// Returns None if `parent` does not refer to a node of this tree.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(
        &mut self,
        data: VariantNode,
        parent: Option<(TreeIndex, EdgeDescriptor)>,
    ) -> Option<TreeIndex> {
        if let Some((parent_idx, _)) = &parent {
            if !self.contains(*parent_idx) {
                return None;
            }
        }

        let node_idx = TreeIndex {
            tree: self.id,
            idx: self.arena.insert(TreeNode {
                data,
                children: Vec::new(),
            }),
        };

        match parent {
            Some((parent_idx, edge)) => {
                if let Some(parent) = self.arena.get_mut(parent_idx.idx) {
                    parent.children.push(ChildLink {
                        child: node_idx,
                        edge,
                    });
                }
            }
            None => self.root = Some(node_idx),
        }

        Some(node_idx)
    }

    pub fn get_node(&self, idx: TreeIndex) -> Option<&TreeNode> {
        if idx.tree != self.id {
            return None;
        }
        self.arena.get(idx.idx)
    }

    pub fn root(&self) -> Option<TreeIndex> {
        self.root
    }

    pub fn root_node(&self) -> Option<&TreeNode> {
        self.root.and_then(|idx| self.get_node(idx))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Pre-order traversal from the root.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        match self.root {
            Some(root) => self.calculate_depth(root),
            None => 0,
        }
    }

    fn calculate_depth(&self, node_idx: TreeIndex) -> usize {
        match self.get_node(node_idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|link| self.calculate_depth(link.child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// First node in pre-order whose project matches.
    #[instrument(level = "debug", skip(self))]
    pub fn find_node(&self, project: &str) -> Option<TreeIndex> {
        self.iter()
            .find(|(_, node)| node.data.project == project)
            .map(|(idx, _)| idx)
    }

    /// Parent of `target` and the edge from the parent to `target`.
    ///
    /// None for the root and for indices that are not part of this tree.
    #[instrument(level = "debug", skip(self))]
    pub fn find_parent(&self, target: TreeIndex) -> Option<(TreeIndex, &EdgeDescriptor)> {
        self.iter().find_map(|(idx, node)| {
            node.children
                .iter()
                .find(|link| link.child == target)
                .map(|link| (idx, &link.edge))
        })
    }

    pub fn find_parent_of(&self, project: &str) -> Option<(TreeIndex, &EdgeDescriptor)> {
        self.find_node(project)
            .and_then(|target| self.find_parent(target))
    }

    /// Path from the root down to `target`, both inclusive.
    ///
    /// Empty if `target` is not in the tree.
    #[instrument(level = "debug", skip(self))]
    pub fn lineage(&self, target: TreeIndex) -> Vec<TreeIndex> {
        if !self.contains(target) {
            return Vec::new();
        }
        let mut path = vec![target];
        let mut current = target;
        while let Some((parent, _)) = self.find_parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}

pub struct TreeIterator<'a> {
    tree: &'a ProjectTree,
    stack: Vec<TreeIndex>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a ProjectTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (TreeIndex, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for link in node.children.iter().rev() {
                    self.stack.push(link.child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
