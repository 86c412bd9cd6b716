//! GitHub contents API backend

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{Error, FileBackend, HttpConfig, Result, StoreConfig};
use plates_core::backend::{FileDescriptor, PutFileRequest, RemoteFile};
use plates_core::record::VersionHandle;

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub API client for repository contents
pub struct GitHub {
    client: reqwest::Client,
    base_url: String,
}

impl GitHub {
    /// Create against api.github.com
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_URL)
    }

    /// Create with custom base URL (GitHub Enterprise, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_http_config(base_url, HttpConfig::default())
    }

    /// Create with custom base URL and HTTP settings
    pub fn with_http_config(base_url: impl Into<String>, http: HttpConfig) -> Result<Self> {
        let client = http.build_client()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_headers(&self, config: &StoreConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("token {}", token))
                    .map_err(|e| Error::config(format!("invalid token: {}", e)))?,
            );
        }
        Ok(headers)
    }

    /// URL of a path under the repository contents endpoint
    fn contents_url(&self, config: &StoreConfig, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            urlencoding::encode(&config.owner),
            urlencoding::encode(&config.repo),
            path.trim_start_matches('/')
        )
    }

    /// Same as `contents_url`, pinned to the configured branch
    fn contents_url_on_branch(&self, config: &StoreConfig, path: &str) -> String {
        format!(
            "{}?ref={}",
            self.contents_url(config, path),
            urlencoding::encode(&config.branch)
        )
    }

    async fn fetch_file(&self, config: &StoreConfig, url: &str) -> Result<Option<RemoteFile>> {
        let response = self
            .client
            .get(url)
            .headers(self.build_headers(config)?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(store_error(response).await);
        }

        let file: ContentFile = response.json().await?;
        let content = file
            .content
            .ok_or_else(|| Error::Decode(format!("{} has no inline content", file.path)))?;
        Ok(Some(RemoteFile {
            path: file.path,
            content,
            handle: VersionHandle::new(file.sha),
        }))
    }
}

/// File object returned by the contents endpoint
#[derive(Debug, Deserialize)]
struct ContentFile {
    path: String,
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

/// Body of a create-or-update request
#[derive(Debug, Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

/// Turn a non-success response into an error carrying the store's text
async fn store_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    Error::store(status, text)
}

#[async_trait]
impl FileBackend for GitHub {
    async fn list_dir(&self, config: &StoreConfig, dir: &str) -> Result<Vec<FileDescriptor>> {
        let url = self.contents_url_on_branch(config, dir);
        let response = self
            .client
            .get(&url)
            .headers(self.build_headers(config)?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(dir, "Records directory does not exist yet");
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(store_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn get_file(&self, config: &StoreConfig, path: &str) -> Result<Option<RemoteFile>> {
        let url = self.contents_url_on_branch(config, path);
        self.fetch_file(config, &url).await
    }

    async fn fetch_entry(
        &self,
        config: &StoreConfig,
        entry: &FileDescriptor,
    ) -> Result<Option<RemoteFile>> {
        match entry.url.as_deref() {
            Some(url) => self.fetch_file(config, url).await,
            None => self.get_file(config, &entry.path).await,
        }
    }

    async fn put_file(
        &self,
        config: &StoreConfig,
        path: &str,
        request: PutFileRequest,
    ) -> Result<()> {
        let url = self.contents_url(config, path);
        let body = PutContentBody {
            message: &request.message,
            content: &request.content,
            branch: &config.branch,
            sha: request.handle.as_ref().map(|h| h.as_str()),
        };

        let response = self
            .client
            .put(&url)
            .headers(self.build_headers(config)?)
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::conflict(path, text));
        }
        if !response.status().is_success() {
            return Err(store_error(response).await);
        }
        Ok(())
    }

    async fn current_user(&self, config: &StoreConfig) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .headers(self.build_headers(config)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }
        let user: GitHubUser = response.json().await?;
        Ok(Some(user.login))
    }

    fn name(&self) -> &'static str {
        "github"
    }
}
