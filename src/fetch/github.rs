use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::entity::{FileKind, FileRecord, RepoCoords};

use super::{FetchError, RepoFetcher};

const API_ROOT: &str = "https://api.github.com";
const RAW_ROOT: &str = "https://raw.githubusercontent.com";
const USER_AGENT: &str = concat!("cartograph/", env!("CARGO_PKG_VERSION"));

/// Remote-listing fetcher: one tree query up front, then per-file body
/// fetches preferring the fast unauthenticated raw mirror with fallback to
/// the contents API.
pub struct GithubFetcher {
    client: Client,
    coords: RepoCoords,
    token: Option<String>,
}

/// Tree listing response from the git data API.
#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

/// One entry of the tree listing.
#[derive(Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl GithubFetcher {
    pub fn new(coords: RepoCoords, token: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            coords,
            token: token.map(String::from),
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("User-Agent", USER_AGENT);
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn blob_url(&self, path: &str) -> String {
        let RepoCoords {
            owner,
            name,
            branch,
        } = &self.coords;
        format!("https://github.com/{owner}/{name}/blob/{branch}/{path}")
    }

    async fn fetch_raw(&self, path: &str) -> Result<String, FetchError> {
        let RepoCoords {
            owner,
            name,
            branch,
        } = &self.coords;
        let url = format!("{RAW_ROOT}/{owner}/{name}/{branch}/{path}");
        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response.text().await?)
    }

    async fn fetch_via_api(&self, path: &str) -> Result<String, FetchError> {
        let RepoCoords {
            owner,
            name,
            branch,
        } = &self.coords;
        let url = format!("{API_ROOT}/repos/{owner}/{name}/contents/{path}?ref={branch}");
        let response = self
            .authorized(self.client.get(&url))
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl RepoFetcher for GithubFetcher {
    async fn list_files(&self) -> Result<Vec<FileRecord>, FetchError> {
        let RepoCoords {
            owner,
            name,
            branch,
        } = &self.coords;
        let url = format!("{API_ROOT}/repos/{owner}/{name}/git/trees/{branch}?recursive=1");
        let response = self
            .authorized(self.client.get(&url))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(FetchError::RepoNotFound(self.coords.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let listing: TreeResponse = response.json().await?;
        if listing.truncated {
            warn!(
                "tree listing for {} was truncated by the upstream API",
                self.coords
            );
        }

        Ok(listing
            .tree
            .into_iter()
            .map(|item| {
                let kind = if item.kind == "tree" {
                    FileKind::Tree
                } else {
                    FileKind::Blob
                };
                let url = self.blob_url(&item.path);
                FileRecord::new(item.path, kind, url)
            })
            .collect())
    }

    async fn fetch_file(&self, path: &str) -> Result<String, FetchError> {
        match self.fetch_raw(path).await {
            Ok(body) => Ok(body),
            Err(err) => {
                debug!("raw mirror miss for {path} ({err}); falling back to contents API");
                self.fetch_via_api(path).await
            }
        }
    }
}
