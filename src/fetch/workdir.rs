use std::path::PathBuf;

use tempfile::TempDir;
use tokio::process::Command;
use walkdir::WalkDir;

use crate::core::entity::{FileKind, FileRecord, RepoCoords};

use super::{FetchError, RepoFetcher};

/// Archive-mode fetcher: materializes the whole repository in a scratch
/// directory with a shallow clone and serves reads from local disk.
///
/// The scratch directory is owned by the fetcher and removed when it drops,
/// on success and failure alike.
pub struct WorkdirFetcher {
    coords: RepoCoords,
    root: PathBuf,
    _scratch: TempDir,
}

impl WorkdirFetcher {
    pub async fn create(coords: RepoCoords) -> Result<Self, FetchError> {
        let scratch = TempDir::new()?;
        let root = scratch.path().join("repo");
        let url = format!("https://github.com/{}/{}.git", coords.owner, coords.name);

        let output = Command::new("git")
            .args(["clone", "--depth", "1", "--branch", &coords.branch, &url])
            .arg(&root)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not found")
                || stderr.contains("Could not find")
                || stderr.contains("Remote branch")
            {
                return Err(FetchError::RepoNotFound(coords.to_string()));
            }
            return Err(FetchError::Git(stderr.trim().to_string()));
        }

        Ok(Self {
            coords,
            root,
            _scratch: scratch,
        })
    }

    fn blob_url(&self, path: &str) -> String {
        let RepoCoords {
            owner,
            name,
            branch,
        } = &self.coords;
        format!("https://github.com/{owner}/{name}/blob/{branch}/{path}")
    }
}

#[async_trait::async_trait]
impl RepoFetcher for WorkdirFetcher {
    async fn list_files(&self) -> Result<Vec<FileRecord>, FetchError> {
        let mut records = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            let entry = entry.map_err(|e| {
                let message = e.to_string();
                FetchError::Io(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message)),
                )
            })?;
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if relative.as_os_str().is_empty() {
                continue;
            }
            let path = relative.to_string_lossy().replace('\\', "/");
            let kind = if entry.file_type().is_dir() {
                FileKind::Tree
            } else {
                FileKind::Blob
            };
            let url = self.blob_url(&path);
            records.push(FileRecord::new(path, kind, url));
        }
        Ok(records)
    }

    async fn fetch_file(&self, path: &str) -> Result<String, FetchError> {
        Ok(tokio::fs::read_to_string(self.root.join(path)).await?)
    }
}
