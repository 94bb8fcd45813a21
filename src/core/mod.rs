pub mod entity;
pub mod events;
pub mod graph;
pub mod orchestrator;
pub mod resolver;

pub use entity::{Entity, FileKind, FileRecord, PropField, Reference, RepoCoords, Role, RuntimeHint};
pub use events::{AnalysisEvent, AnalysisRequest};
pub use graph::{DependencyGraph, EntityNode, GraphBuilder};
pub use orchestrator::RepoAnalyzer;
pub use resolver::ReferenceResolver;
