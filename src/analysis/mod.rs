pub mod classify;
pub mod extract;
pub mod source;

use anyhow::Result;
use tracing::debug;

use crate::core::entity::{Entity, Reference};

use classify::Classifier;
use source::SourceParser;

/// Per-file classifier and static analyzer.
///
/// Decides whether a file is a structural entity and, if so, extracts its
/// name, role, props surface, export names, and raw outbound references.
pub struct FileAnalyzer {
    parser: SourceParser,
    classifier: Classifier,
}

impl FileAnalyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: SourceParser::new()?,
            classifier: Classifier::new(),
        })
    }

    /// Analyzes one file. `None` means the file is not a structural entity
    /// or could not be parsed; neither aborts the surrounding run.
    pub fn analyze(&mut self, path: &str, content: &str) -> Option<Entity> {
        if !classify::is_candidate_path(path) {
            return None;
        }
        if !self.classifier.is_eligible(path, content) {
            return None;
        }

        let Some(tree) = self.parser.parse(path, content) else {
            debug!("giving up on unparseable file {path}");
            return None;
        };
        let root = tree.root_node();
        let source = content.as_bytes();

        let name = extract::declared_name(&root, source, path);
        let role = self.classifier.role_for(path, content);
        let uses: Vec<Reference> = extract::reference_names(&root, source)
            .into_iter()
            .map(Reference::Unresolved)
            .collect();

        let mut entity = Entity::new(name.clone(), role, path.to_string())
            .with_props(extract::props_fields(&root, source, &name))
            .with_exports(extract::export_names(&root, source))
            .with_uses(uses)
            .with_source(content.to_string())
            .with_runtime(classify::runtime_hint(content));
        entity.description = extract::leading_description(&root, source);

        Some(entity)
    }
}
