use serde::{Deserialize, Serialize};

use super::entity::{Entity, FileRecord, RepoCoords};

/// Ordered, tagged records streamed while an analysis run progresses.
///
/// Within one run: `files` is emitted once, early; `progress` precedes the
/// analysis of each candidate file; `component` follows each successful
/// classification; and the stream always ends with exactly one terminal
/// `complete` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisEvent {
    Status {
        message: String,
    },
    Files {
        files: Vec<FileRecord>,
        repo: RepoCoords,
    },
    Progress {
        current: usize,
        total: usize,
        path: String,
    },
    Component {
        entity: Entity,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        entities: Vec<Entity>,
        total_files: usize,
        analyzed_files: usize,
        from_cache: bool,
    },
    Error {
        message: String,
    },
}

/// Inbound request for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Repository location: `owner/name`, `owner/name@branch`, or a GitHub
    /// URL.
    pub location: String,
    /// Branch to analyze when the location does not pin one.
    pub branch: String,
    /// Emit every tree entry in the `files` event instead of only the
    /// structurally relevant ones.
    pub include_all: bool,
}

impl AnalysisRequest {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            branch: "main".to_string(),
            include_all: false,
        }
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    pub fn with_include_all(mut self, include_all: bool) -> Self {
        self.include_all = include_all;
        self
    }
}
