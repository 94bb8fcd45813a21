use serde::{Deserialize, Serialize};

/// Categorical role of a discovered entity within the analyzed application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Page,
    Layout,
    Component,
    Hook,
    Context,
    Utility,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Page => "page",
            Role::Layout => "layout",
            Role::Component => "component",
            Role::Hook => "hook",
            Role::Context => "context",
            Role::Utility => "utility",
        }
    }
}

/// Where the file executes under the analyzed framework's split rendering
/// model. Files carrying a leading `"use client"` directive run on the
/// client; everything else defaults to the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeHint {
    Client,
    Server,
}

/// One member of an entity's declared props surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub required: bool,
}

/// An outbound reference held by an entity.
///
/// References start out as opaque text gathered by the analyzer's heuristics
/// and are rewritten to `Resolved` canonical entity names by the resolver.
/// Text the resolver cannot match stays `Unresolved` rather than becoming an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "name", rename_all = "lowercase")]
pub enum Reference {
    Unresolved(String),
    Resolved(String),
}

impl Reference {
    pub fn name(&self) -> &str {
        match self {
            Reference::Unresolved(name) | Reference::Resolved(name) => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }
}

/// A discovered structural unit of the analyzed codebase.
///
/// Identity is the entity name within one run; name collisions are tolerated
/// (last write wins) rather than enforced globally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub role: Role,
    /// Repository-relative path of the defining file. Always corresponds to
    /// exactly one [`FileRecord`] path from the same run.
    pub file: String,
    pub description: Option<String>,
    pub props: Vec<PropField>,
    /// Names exported from the defining file; feeds the resolver's export
    /// index.
    pub exports: Vec<String>,
    pub uses: Vec<Reference>,
    /// Derived reverse index: names of entities whose resolved `uses`
    /// contain this entity. Never authored directly.
    pub used_by: Vec<String>,
    /// Raw text of the defining file.
    pub source: String,
    pub runtime: RuntimeHint,
}

impl Entity {
    pub fn new(name: String, role: Role, file: String) -> Self {
        Self {
            name,
            role,
            file,
            description: None,
            props: Vec::new(),
            exports: Vec::new(),
            uses: Vec::new(),
            used_by: Vec::new(),
            source: String::new(),
            runtime: RuntimeHint::Server,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_props(mut self, props: Vec<PropField>) -> Self {
        self.props = props;
        self
    }

    pub fn with_exports(mut self, exports: Vec<String>) -> Self {
        self.exports = exports;
        self
    }

    pub fn with_uses(mut self, uses: Vec<Reference>) -> Self {
        self.uses = uses;
        self
    }

    pub fn with_source(mut self, source: String) -> Self {
        self.source = source;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeHint) -> Self {
        self.runtime = runtime;
        self
    }
}

/// Kind of an entry in the repository tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Blob,
    Tree,
}

/// One entry discovered in the repository tree, independent of whether the
/// classifier later accepts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub kind: FileKind,
    pub url: String,
}

impl FileRecord {
    pub fn new(path: String, kind: FileKind, url: String) -> Self {
        Self { path, kind, url }
    }
}

/// Coordinates identifying one (repository, branch) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoCoords {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

impl RepoCoords {
    pub fn new(owner: &str, name: &str, branch: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
        }
    }

    /// Parses `owner/name`, `owner/name@branch`, or a full GitHub URL
    /// (optionally with `.git` or `/tree/<branch>` suffixes). An explicit
    /// `@branch` or `/tree/<branch>` segment wins over `default_branch`.
    ///
    /// Returns `None` for malformed coordinates; the caller reports those as
    /// a terminal error.
    pub fn parse(location: &str, default_branch: &str) -> Option<Self> {
        let mut input = location.trim();
        let mut branch: Option<&str> = None;

        if let Some(rest) = input
            .strip_prefix("https://github.com/")
            .or_else(|| input.strip_prefix("http://github.com/"))
            .or_else(|| input.strip_prefix("github.com/"))
        {
            input = rest.trim_end_matches('/');
            if let Some((repo_part, branch_part)) = input.split_once("/tree/") {
                input = repo_part;
                branch = Some(branch_part.split('/').next().unwrap_or(branch_part));
            }
            input = input.strip_suffix(".git").unwrap_or(input);
        } else if let Some((repo_part, branch_part)) = input.split_once('@') {
            input = repo_part;
            branch = Some(branch_part);
        }

        let (owner, name) = input.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        let branch = branch.filter(|b| !b.is_empty()).unwrap_or(default_branch);
        if branch.is_empty() {
            return None;
        }

        Some(Self::new(owner, name, branch))
    }

    /// `owner/name` form used as the cache fingerprint's location component.
    pub fn location(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.branch)
    }
}
