//! Tests for TreeBuilder

use std::collections::HashSet;

use rstest::rstest;

use preprocess_graph::domain::{
    DomainError, GraphRegistry, ProjectTree, RootFallback, TreeBuilder,
};
use preprocess_graph::util::testing;

/// Registry from node names and (from, to) links, all with mapping "srg".
fn registry(nodes: &[&str], links: &[(&str, &str)]) -> GraphRegistry {
    let mut registry = GraphRegistry::new();
    for (i, project) in nodes.iter().enumerate() {
        registry.create_node(project, i as u32, "srg").unwrap();
    }
    for (from, to) in links {
        registry.link_projects(from, to, None).unwrap();
    }
    registry
}

/// Tree edges as (parent, child, inverted), in pre-order.
fn edges(tree: &ProjectTree) -> Vec<(String, String, bool)> {
    tree.iter()
        .flat_map(|(_, node)| {
            node.children.iter().map(move |link| {
                let child = tree.get_node(link.child).unwrap();
                (
                    node.data.project.clone(),
                    child.data.project.clone(),
                    link.edge.inverted,
                )
            })
        })
        .collect()
}

fn projects(tree: &ProjectTree) -> Vec<String> {
    tree.iter().map(|(_, n)| n.data.project.clone()).collect()
}

#[test]
fn given_empty_registry_when_building_then_returns_none() {
    // Arrange
    let registry = GraphRegistry::new();

    // Act
    let tree = TreeBuilder::new(&registry).build("main").unwrap();

    // Assert
    assert!(tree.is_none());
}

#[test]
fn given_chain_when_building_from_middle_then_middle_is_root() {
    // Arrange
    testing::init_test_setup();
    let registry = registry(&["v1", "v2", "v3"], &[("v1", "v2"), ("v2", "v3")]);

    // Act
    let tree = TreeBuilder::new(&registry).build("v2").unwrap().unwrap();

    // Assert
    let root = tree.root_node().unwrap();
    assert_eq!(root.data.project, "v2");
    let children: Vec<_> = root
        .children
        .iter()
        .map(|link| tree.get_node(link.child).unwrap().data.project.clone())
        .collect();
    assert_eq!(children, vec!["v1", "v3"]);
    assert_eq!(
        edges(&tree),
        vec![
            ("v2".to_string(), "v1".to_string(), true),
            ("v2".to_string(), "v3".to_string(), false),
        ]
    );
}

#[test]
fn given_unregistered_main_when_building_then_falls_back_to_first_node() {
    // Arrange
    let registry = registry(&["first", "second"], &[("second", "first")]);

    // Act
    let tree = TreeBuilder::new(&registry).build("missing").unwrap().unwrap();

    // Assert
    assert_eq!(tree.root_node().unwrap().data.project, "first");
    assert_eq!(
        edges(&tree),
        vec![("first".to_string(), "second".to_string(), true)]
    );
}

#[test]
fn given_unregistered_main_and_reject_policy_when_building_then_errors() {
    // Arrange
    let registry = registry(&["first", "second"], &[("first", "second")]);

    // Act
    let result = TreeBuilder::new(&registry)
        .with_fallback(RootFallback::Reject)
        .build("missing");

    // Assert
    assert_eq!(
        result.unwrap_err(),
        DomainError::InvalidRootConfiguration {
            main: "missing".to_string()
        }
    );
}

#[test]
fn given_single_unlinked_node_when_building_then_tree_is_single_node() {
    let registry = registry(&["alone"], &[]);

    let tree = TreeBuilder::new(&registry).build("alone").unwrap().unwrap();

    assert_eq!(tree.len(), 1);
    assert!(tree.root_node().unwrap().children.is_empty());
}

#[test]
fn given_disconnected_node_when_building_then_omits_it() {
    let registry = registry(&["a", "b", "island"], &[("a", "b")]);

    let tree = TreeBuilder::new(&registry).build("a").unwrap().unwrap();

    assert_eq!(projects(&tree), vec!["a", "b"]);
    assert!(tree.find_node("island").is_none());
}

//   r --- a
//    \   /
//     \ /
//      b
#[test]
fn given_triangle_when_building_then_attaches_by_hop_distance() {
    // Arrange: links declared so that a depth-first walk would hang b below a
    let registry = registry(&["r", "a", "b"], &[("r", "a"), ("a", "b"), ("r", "b")]);

    // Act
    let tree = TreeBuilder::new(&registry).build("r").unwrap().unwrap();

    // Assert
    assert_eq!(
        edges(&tree),
        vec![
            ("r".to_string(), "a".to_string(), false),
            ("r".to_string(), "b".to_string(), false),
        ]
    );
    assert_eq!(tree.depth(), 2);
}

#[test]
fn given_diamond_when_building_then_first_discovery_wins() {
    // Arrange
    //     r
    //    / \
    //   a   b
    //    \ /
    //     c
    let registry = registry(
        &["r", "a", "b", "c"],
        &[("r", "a"), ("r", "b"), ("b", "c"), ("a", "c")],
    );

    // Act
    let tree = TreeBuilder::new(&registry).build("r").unwrap().unwrap();

    // Assert: a is dequeued before b, so c hangs below a even though b-c was linked first
    let (parent, _) = tree.find_parent_of("c").unwrap();
    assert_eq!(tree.get_node(parent).unwrap().data.project, "a");
    assert_eq!(tree.len(), 4);
}

#[rstest]
#[case::from_hub("hub")]
#[case::from_leaf("d")]
#[case::from_cycle_member("b")]
fn given_cyclic_graph_when_building_then_tree_spans_reachable_nodes(#[case] main: &str) {
    // Arrange: cycle hub-a-b-hub, tail b-c-d, plus unreachable pair x-y
    let registry = registry(
        &["hub", "a", "b", "c", "d", "x", "y"],
        &[
            ("hub", "a"),
            ("a", "b"),
            ("b", "hub"),
            ("b", "c"),
            ("c", "d"),
            ("x", "y"),
        ],
    );

    // Act
    let tree = TreeBuilder::new(&registry).build(main).unwrap().unwrap();

    // Assert
    let names = projects(&tree);
    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(names.len(), 5);
    assert_eq!(unique.len(), 5);
    assert_eq!(edges(&tree).len(), names.len() - 1);
    assert_eq!(tree.root_node().unwrap().data.project, main);
    assert!(!unique.contains(&"x".to_string()));
}

#[rstest]
#[case("v1")]
#[case("v2")]
#[case("v3")]
#[case("v4")]
fn given_declared_links_when_building_then_inverted_matches_walk_direction(#[case] main: &str) {
    // Arrange
    let registry = registry(
        &["v1", "v2", "v3", "v4"],
        &[("v1", "v2"), ("v3", "v2"), ("v3", "v4"), ("v4", "v1")],
    );

    // Act
    let tree = TreeBuilder::new(&registry).build(main).unwrap().unwrap();

    // Assert: forward iff the tree parent is the declaring side
    for (parent, child, inverted) in edges(&tree) {
        let p = registry.find(&parent).unwrap();
        let c = registry.find(&child).unwrap();
        let record = registry
            .edges()
            .iter()
            .find(|e| e.connects(p, c))
            .unwrap();
        assert_eq!(inverted, record.a != p, "edge {} -> {}", parent, child);
    }
}

#[test]
fn given_same_registry_when_building_twice_then_structure_is_identical() {
    let registry = registry(
        &["a", "b", "c", "d", "e"],
        &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("e", "d")],
    );
    let builder = TreeBuilder::new(&registry);

    let first = builder.build("c").unwrap().unwrap();
    let second = builder.build("c").unwrap().unwrap();

    assert_eq!(projects(&first), projects(&second));
    assert_eq!(edges(&first), edges(&second));
}
