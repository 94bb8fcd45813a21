use regex::Regex;
use std::path::Path;

use crate::core::entity::{Role, RuntimeHint};

use super::source::extension;

/// Directories whose contents are treated as structural by default.
const STRUCTURAL_DIRS: &[&str] = &[
    "components",
    "app",
    "pages",
    "hooks",
    "context",
    "contexts",
    "layouts",
    "lib",
    "utils",
    "helpers",
    "ui",
];

/// Subset of structural directories that signal plain utility modules.
const UTILITY_DIRS: &[&str] = &["lib", "utils", "helpers"];

/// Framework-special filenames recognized by path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialFile {
    Page,
    Layout,
    Loading,
    ErrorPage,
    NotFound,
    Template,
    RouteHandler,
}

/// Path and content heuristics deciding whether a file is a structural
/// entity at all, and which role it plays.
pub struct Classifier {
    markup_return: Regex,
    capitalized_export: Regex,
    hook_export: Regex,
    callable_export: Regex,
    create_context: Regex,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            markup_return: Regex::new(r"(return|=>)\s*\(?\s*<[A-Za-z]").unwrap(),
            capitalized_export: Regex::new(
                r"export\s+(default\s+)?(async\s+)?(function|class|const|let|var)\s+[A-Z]",
            )
            .unwrap(),
            hook_export: Regex::new(
                r"export\s+(default\s+)?(async\s+)?(function|const)\s+use[A-Z]",
            )
            .unwrap(),
            callable_export: Regex::new(
                r"export\s+(default\s+)?(async\s+)?(function|class)\b|export\s+const\s+[\w$]+\s*(:[^=]+)?=\s*(async\s+)?(\(|function\b|[\w$]+\s*=>)",
            )
            .unwrap(),
            create_context: Regex::new(r"createContext\s*[<(]").unwrap(),
        }
    }

    /// Candidate iff any eligibility signal holds. Test/spec files never
    /// reach this point (see [`is_candidate_path`]).
    pub fn is_eligible(&self, path: &str, content: &str) -> bool {
        in_structural_dir(path)
            || special_filename(path).is_some()
            || has_hook_filename(path)
            || self.markup_return.is_match(content)
            || self.capitalized_export.is_match(content)
            || self.hook_export.is_match(content)
            || self.callable_export.is_match(content)
    }

    /// Prioritized role dispatch: an ordered rule list evaluated in fixed
    /// sequence, first match wins.
    pub fn role_for(&self, path: &str, content: &str) -> Role {
        let special = special_filename(path);
        let rules = [
            (special == Some(SpecialFile::RouteHandler), Role::Utility),
            (special == Some(SpecialFile::Page), Role::Page),
            (special == Some(SpecialFile::Layout), Role::Layout),
            (
                matches!(
                    special,
                    Some(SpecialFile::Loading)
                        | Some(SpecialFile::ErrorPage)
                        | Some(SpecialFile::NotFound)
                        | Some(SpecialFile::Template)
                ),
                Role::Page,
            ),
            (
                has_hook_filename(path) || self.hook_export.is_match(content),
                Role::Hook,
            ),
            (
                self.create_context.is_match(content) || stem(path).ends_with("Context"),
                Role::Context,
            ),
            (
                in_utility_dir(path)
                    || (!self.markup_return.is_match(content)
                        && !self.capitalized_export.is_match(content)),
                Role::Utility,
            ),
        ];

        rules
            .iter()
            .find(|(hit, _)| *hit)
            .map(|(_, role)| *role)
            .unwrap_or(Role::Component)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheap path-only pre-filter applied before any content is fetched.
/// Test/spec files are always excluded.
pub fn is_candidate_path(path: &str) -> bool {
    if !matches!(extension(path), "js" | "jsx" | "ts" | "tsx" | "mjs") {
        return false;
    }
    if path.ends_with(".d.ts") {
        return false;
    }
    let lowered = path.to_ascii_lowercase();
    const EXCLUDED_DIRS: &[&str] = &[
        "node_modules/",
        ".next/",
        "dist/",
        "build/",
        "out/",
        "coverage/",
        "__tests__/",
        "__mocks__/",
    ];
    if EXCLUDED_DIRS.iter().any(|dir| lowered.contains(dir)) {
        return false;
    }
    !(lowered.contains(".test.") || lowered.contains(".spec."))
}

/// Recognizes the framework's by-convention filenames.
pub fn special_filename(path: &str) -> Option<SpecialFile> {
    match stem(path) {
        "page" => Some(SpecialFile::Page),
        "layout" => Some(SpecialFile::Layout),
        "loading" => Some(SpecialFile::Loading),
        "error" | "global-error" => Some(SpecialFile::ErrorPage),
        "not-found" => Some(SpecialFile::NotFound),
        "template" => Some(SpecialFile::Template),
        "route" => Some(SpecialFile::RouteHandler),
        _ => None,
    }
}

pub fn in_structural_dir(path: &str) -> bool {
    path_segments(path).any(|seg| STRUCTURAL_DIRS.contains(&seg))
}

fn in_utility_dir(path: &str) -> bool {
    path_segments(path).any(|seg| UTILITY_DIRS.contains(&seg))
}

/// `useCart.ts`, `use-cart.ts` and friends: a reserved-prefix identifier in
/// the filename marks a hook module even before content is inspected.
pub fn has_hook_filename(path: &str) -> bool {
    let stem = stem(path);
    stem.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase() || c == '-' || c == '_')
}

/// Leading `"use client"` directive marks client execution; everything else
/// defaults to the server.
pub fn runtime_hint(content: &str) -> RuntimeHint {
    for line in content.lines().take(10) {
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with("//")
            || trimmed.starts_with("/*")
            || trimmed.starts_with('*')
        {
            continue;
        }
        if trimmed.starts_with("'use client'") || trimmed.starts_with("\"use client\"") {
            return RuntimeHint::Client;
        }
        return RuntimeHint::Server;
    }
    RuntimeHint::Server
}

fn stem(path: &str) -> &str {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    file_name.split('.').next().unwrap_or(file_name)
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    let dir = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    dir.split('/').filter(|seg| !seg.is_empty())
}
