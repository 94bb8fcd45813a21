use cartograph::core::entity::{Entity, Reference, Role};
use cartograph::core::graph::{self, EntityNode, GraphBuilder};

fn entity(name: &str, role: Role, uses: &[Reference]) -> Entity {
    Entity::new(
        name.to_string(),
        role,
        format!("components/{}.tsx", name.to_lowercase()),
    )
    .with_uses(uses.to_vec())
}

#[test]
fn graph_builder_adds_nodes_and_edges() {
    let mut gb = GraphBuilder::new();

    gb.add_node(EntityNode {
        name: "Page".to_string(),
        role: Role::Page,
        file: "app/page.tsx".to_string(),
    });
    gb.add_node(EntityNode {
        name: "Button".to_string(),
        role: Role::Component,
        file: "components/button.tsx".to_string(),
    });

    assert!(gb.add_edge("Page", "Button").is_some());
    assert!(gb.add_edge("Page", "Missing").is_none());

    let g = gb.build();
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn from_entities_links_only_resolved_references() {
    let entities = vec![
        entity(
            "Page",
            Role::Page,
            &[
                Reference::Resolved("Button".to_string()),
                Reference::Unresolved("mystery".to_string()),
                Reference::Resolved("NotInRun".to_string()),
            ],
        ),
        entity("Button", Role::Component, &[]),
    ];

    let g = GraphBuilder::from_entities(&entities);
    assert_eq!(g.node_count(), 2);
    // The unresolved text and the out-of-run name contribute no edges.
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn dot_rendering_names_the_entities() {
    let entities = vec![
        entity("Page", Role::Page, &[Reference::Resolved("Button".to_string())]),
        entity("Button", Role::Component, &[]),
    ];

    let dot = graph::to_dot(&GraphBuilder::from_entities(&entities));
    assert!(dot.contains("digraph"));
    assert!(dot.contains("Page (page)"));
    assert!(dot.contains("Button (component)"));
}
