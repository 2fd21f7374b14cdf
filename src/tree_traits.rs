//! Rendering of project trees for terminal output.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{ChildLink, ProjectTree, TreeIndex, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn node_label(node: &TreeNode, incoming: Option<&ChildLink>) -> String {
    match incoming {
        Some(link) => format!("{} {}", link.edge, node.data),
        None => node.data.to_string(),
    }
}

impl TreeNodeConvert for ProjectTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let Some((root_idx, root)) = self
            .root()
            .and_then(|idx| self.get_node(idx).map(|node| (idx, node)))
        else {
            return Tree::new("Empty tree".to_string());
        };

        fn build_tree(tree: &ProjectTree, node_idx: TreeIndex, parent_tree: &mut Tree<String>) {
            if let Some(node) = tree.get_node(node_idx) {
                for link in &node.children {
                    if let Some(child) = tree.get_node(link.child) {
                        let mut child_tree = Tree::new(node_label(child, Some(link)));
                        build_tree(tree, link.child, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let mut rendered = Tree::new(node_label(root, None));
        build_tree(self, root_idx, &mut rendered);
        rendered
    }
}
