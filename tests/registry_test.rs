//! Tests for GraphRegistry

use std::path::PathBuf;

use rstest::rstest;

use preprocess_graph::domain::{DomainError, EdgeDescriptor, GraphRegistry};

#[test]
fn given_new_identifier_when_creating_node_then_registers_in_order() {
    // Arrange
    let mut registry = GraphRegistry::new();

    // Act
    let a = registry.create_node("1.12.2", 11202, "srg").unwrap();
    let b = registry.create_node("1.8.9", 10809, "srg").unwrap();

    // Assert
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.find("1.12.2"), Some(a));
    assert_eq!(registry.find("1.8.9"), Some(b));
    let order: Vec<_> = registry.nodes().map(|(_, n)| n.project.clone()).collect();
    assert_eq!(order, vec!["1.12.2", "1.8.9"]);
    assert_eq!(registry.node(b).unwrap().version, 10809);
}

#[test]
fn given_registered_identifier_when_creating_again_then_errors() {
    // Arrange
    let mut registry = GraphRegistry::new();
    registry.create_node("1.12.2", 11202, "srg").unwrap();

    // Act
    let result = registry.create_node("1.12.2", 11202, "yarn");

    // Assert
    assert_eq!(
        result,
        Err(DomainError::DuplicateNode("1.12.2".to_string()))
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn given_link_when_viewing_both_sides_then_descriptors_are_symmetric() {
    // Arrange
    let mut registry = GraphRegistry::new();
    let a = registry.create_node("a", 1, "srg").unwrap();
    let b = registry.create_node("b", 2, "srg").unwrap();
    let extra = Some(PathBuf::from("a-b.txt"));

    // Act
    registry.link(a, b, extra.clone()).unwrap();

    // Assert
    let from_a: Vec<_> = registry.neighbors(a).collect();
    let from_b: Vec<_> = registry.neighbors(b).collect();
    assert_eq!(from_a, vec![(b, EdgeDescriptor::new(extra.clone(), false))]);
    assert_eq!(from_b, vec![(a, EdgeDescriptor::new(extra, true))]);
    assert_eq!(registry.edges().len(), 1);
}

#[test]
fn given_identical_link_when_linking_again_then_is_idempotent() {
    // Arrange
    let mut registry = GraphRegistry::new();
    let a = registry.create_node("a", 1, "srg").unwrap();
    let b = registry.create_node("b", 2, "srg").unwrap();
    registry.link(a, b, None).unwrap();

    // Act
    let result = registry.link(a, b, None);

    // Assert
    assert!(result.is_ok());
    assert_eq!(registry.edges().len(), 1);
    assert_eq!(registry.neighbors(a).count(), 1);
}

#[rstest]
#[case::different_extra_mappings(false, Some("other.txt"))]
#[case::reverse_declaration(true, None)]
fn given_linked_pair_when_linking_differently_then_conflicts(
    #[case] reverse: bool,
    #[case] extra: Option<&str>,
) {
    // Arrange
    let mut registry = GraphRegistry::new();
    let a = registry.create_node("a", 1, "srg").unwrap();
    let b = registry.create_node("b", 2, "srg").unwrap();
    registry.link(a, b, None).unwrap();

    // Act
    let (from, to) = if reverse { (b, a) } else { (a, b) };
    let result = registry.link(from, to, extra.map(PathBuf::from));

    // Assert
    assert!(matches!(result, Err(DomainError::ConflictingEdge { .. })));
    assert_eq!(registry.edges().len(), 1);
}

#[test]
fn given_same_node_when_linking_to_itself_then_errors() {
    let mut registry = GraphRegistry::new();
    let a = registry.create_node("a", 1, "srg").unwrap();

    let result = registry.link(a, a, None);

    assert_eq!(result, Err(DomainError::SelfLink("a".to_string())));
}

#[test]
fn given_unknown_identifier_when_linking_projects_then_errors() {
    let mut registry = GraphRegistry::new();
    registry.create_node("a", 1, "srg").unwrap();

    let result = registry.link_projects("a", "missing", None);

    assert_eq!(result, Err(DomainError::UnknownNode("missing".to_string())));
}

#[test]
fn given_several_links_when_viewing_neighbors_then_keeps_link_order() {
    // Arrange
    let mut registry = GraphRegistry::new();
    for project in ["hub", "x", "y", "z"] {
        registry.create_node(project, 1, "srg").unwrap();
    }

    // Act
    registry.link_projects("y", "hub", None).unwrap();
    registry.link_projects("hub", "z", None).unwrap();
    registry.link_projects("x", "hub", None).unwrap();

    // Assert
    let hub = registry.find("hub").unwrap();
    let neighbors: Vec<_> = registry
        .neighbors(hub)
        .map(|(id, edge)| (registry.node(id).unwrap().project.clone(), edge.inverted))
        .collect();
    assert_eq!(
        neighbors,
        vec![
            ("y".to_string(), true),
            ("z".to_string(), false),
            ("x".to_string(), true),
        ]
    );
}
