use petgraph::dot::{Config, Dot};
use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::entity::{Entity, Role};

/// Directed graph over the resolved entity list: one node per entity, one
/// edge per confirmed `uses` relationship.
pub type DependencyGraph = Graph<EntityNode, UsesEdge, Directed>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityNode {
    pub name: String,
    pub role: Role,
    pub file: String,
}

impl fmt::Display for EntityNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.role.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsesEdge;

impl fmt::Display for UsesEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uses")
    }
}

pub struct GraphBuilder {
    graph: DependencyGraph,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Assembles the graph for an already-resolved entity list. Unresolved
    /// references and references to names outside the run are skipped; they
    /// are annotations, not edges.
    pub fn from_entities(entities: &[Entity]) -> DependencyGraph {
        let mut builder = Self::new();
        for entity in entities {
            builder.add_node(EntityNode {
                name: entity.name.clone(),
                role: entity.role,
                file: entity.file.clone(),
            });
        }
        for entity in entities {
            for reference in entity.uses.iter().filter(|r| r.is_resolved()) {
                builder.add_edge(&entity.name, reference.name());
            }
        }
        builder.build()
    }

    pub fn add_node(&mut self, node: EntityNode) -> NodeIndex {
        let name = node.name.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(name, index);
        index
    }

    pub fn add_edge(&mut self, source: &str, target: &str) -> Option<petgraph::graph::EdgeIndex> {
        let source_idx = self.node_map.get(source)?;
        let target_idx = self.node_map.get(target)?;
        Some(self.graph.add_edge(*source_idx, *target_idx, UsesEdge))
    }

    pub fn build(self) -> DependencyGraph {
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// DOT rendering of the dependency graph.
pub fn to_dot(graph: &DependencyGraph) -> String {
    format!("{}", Dot::with_config(graph, &[Config::EdgeNoLabel]))
}
