use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::analysis::extract::pascal_case;

use super::entity::{Entity, Reference};

/// Resolves raw free-text `uses` references into confirmed edges between
/// discovered entities.
///
/// Three lookup indexes are consulted in fixed order: declared entity name,
/// declared export name, derived filename (as-is and capitalized). The
/// first hit wins; later indexes are never consulted once a reference is
/// resolved. Text with no match anywhere stays `Unresolved` rather than
/// becoming an error, so weak extraction heuristics degrade gracefully.
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    by_name: HashMap<String, String>,
    by_export: HashMap<String, String>,
    by_filename: HashMap<String, String>,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the lookup indexes from the discovered entity list. Name
    /// collisions follow entity identity semantics: last write wins.
    pub fn build_indexes(&mut self, entities: &[Entity]) {
        self.by_name.clear();
        self.by_export.clear();
        self.by_filename.clear();

        for entity in entities {
            self.by_name.insert(entity.name.clone(), entity.name.clone());

            for export in &entity.exports {
                self.by_export.insert(export.clone(), entity.name.clone());
            }

            let stem = file_stem(&entity.file);
            if !stem.is_empty() {
                self.by_filename.insert(stem.to_string(), entity.name.clone());
                self.by_filename.insert(capitalize(stem), entity.name.clone());
                self.by_filename.insert(pascal_case(stem), entity.name.clone());
            }
        }
    }

    /// Resolves every entity's raw references in place, then maintains the
    /// derived `used_by` index, strips self-references, and de-duplicates.
    /// Total and idempotent: resolving an already-resolved list changes
    /// nothing.
    pub fn resolve(&self, entities: &mut [Entity]) {
        let index_of: HashMap<String, usize> = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        // Phase one over an immutable view: decide every rewrite up front.
        let mut rewrites: Vec<(usize, usize, String)> = Vec::new();
        for (i, entity) in entities.iter().enumerate() {
            for (j, reference) in entity.uses.iter().enumerate() {
                if let Some(canonical) = self.lookup(reference.name()) {
                    rewrites.push((i, j, canonical));
                }
            }
        }

        for (i, j, canonical) in rewrites {
            let referrer = entities[i].name.clone();
            entities[i].uses[j] = Reference::Resolved(canonical.clone());
            if let Some(&target) = index_of.get(&canonical) {
                if !entities[target].used_by.contains(&referrer) {
                    entities[target].used_by.push(referrer);
                }
            }
        }

        for entity in entities.iter_mut() {
            let own_name = entity.name.clone();
            entity.uses.retain(|r| r.name() != own_name);
            dedup_references(&mut entity.uses);
            entity.used_by.retain(|n| *n != own_name);
            dedup_names(&mut entity.used_by);
        }
    }

    fn lookup(&self, raw: &str) -> Option<String> {
        self.by_name
            .get(raw)
            .or_else(|| self.by_export.get(raw))
            .or_else(|| self.by_filename.get(raw))
            .cloned()
    }
}

fn dedup_references(references: &mut Vec<Reference>) {
    // A name can surface both as opaque text and as a resolved edge; the
    // resolved form wins regardless of order.
    let resolved: HashSet<String> = references
        .iter()
        .filter(|r| r.is_resolved())
        .map(|r| r.name().to_string())
        .collect();
    let mut seen = HashSet::new();
    references.retain(|r| {
        if !r.is_resolved() && resolved.contains(r.name()) {
            return false;
        }
        seen.insert(r.name().to_string())
    });
}

fn dedup_names(names: &mut Vec<String>) {
    let mut seen = HashSet::new();
    names.retain(|n| seen.insert(n.clone()));
}

fn file_stem(path: &str) -> &str {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    file_name.split('.').next().unwrap_or(file_name)
}

fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
