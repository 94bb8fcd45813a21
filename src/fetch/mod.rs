pub mod github;
pub mod workdir;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::entity::{FileRecord, RepoCoords};

/// Errors raised while acquiring repository contents.
///
/// `RepoNotFound` (and any listing failure) is terminal for a run;
/// per-file fetch errors are recoverable and recorded as skips.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("repository or branch not found: {0}")]
    RepoNotFound(String),
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("git: {0}")]
    Git(String),
}

/// A way to obtain repository contents: the full flat file list, plus any
/// individual file's text by path.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    async fn list_files(&self) -> Result<Vec<FileRecord>, FetchError>;
    async fn fetch_file(&self, path: &str) -> Result<String, FetchError>;
}

/// Interchangeable acquisition strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// One remote tree query, then per-file body fetches.
    Api,
    /// Materialize the repository in a scratch directory and read from disk.
    Workdir,
}

/// Builds the fetcher for a strategy. Workdir construction performs the
/// clone up front, so a missing repository surfaces here.
pub async fn build_fetcher(
    strategy: FetchStrategy,
    coords: &RepoCoords,
    token: Option<&str>,
) -> Result<Box<dyn RepoFetcher>, FetchError> {
    match strategy {
        FetchStrategy::Api => Ok(Box::new(github::GithubFetcher::new(coords.clone(), token))),
        FetchStrategy::Workdir => Ok(Box::new(
            workdir::WorkdirFetcher::create(coords.clone()).await?,
        )),
    }
}
