//! Store coordinates and their local persistence
//!
//! The record store never reads configuration on its own: every operation
//! takes a `&StoreConfig`, so the coordinates cannot change mid-operation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use crate::error::{Error, Result};

/// Branch used when none is configured
pub const DEFAULT_BRANCH: &str = "main";

/// Target repository and credential for the record store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch holding the records
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Access token, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl StoreConfig {
    /// Create config for a repository on the default branch
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        let owner: String = owner.into();
        let repo: String = repo.into();
        Self {
            owner: owner.trim().to_string(),
            repo: repo.trim().to_string(),
            branch: default_branch(),
            token: None,
        }
    }

    /// Use a different branch; blank falls back to the default
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        let branch: String = branch.into();
        let branch = branch.trim().to_string();
        self.branch = if branch.is_empty() {
            default_branch()
        } else {
            branch
        };
        self
    }

    /// Attach an access token; blank clears it
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        let token = token.trim().to_string();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Create from `PLATES_OWNER`, `PLATES_REPO`, `PLATES_BRANCH` and `PLATES_TOKEN`
    pub fn from_env() -> Result<Self> {
        let owner = std::env::var("PLATES_OWNER")
            .map_err(|_| Error::config("PLATES_OWNER not set"))?;
        let repo =
            std::env::var("PLATES_REPO").map_err(|_| Error::config("PLATES_REPO not set"))?;
        let mut config = Self::new(owner, repo);
        if let Ok(branch) = std::env::var("PLATES_BRANCH") {
            config = config.with_branch(branch);
        }
        if let Ok(token) = std::env::var("PLATES_TOKEN") {
            config = config.with_token(token);
        }
        config.validate()?;
        Ok(config)
    }

    /// Owner and repo are required to address the store
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(Error::config("repository owner is missing"));
        }
        if self.repo.trim().is_empty() {
            return Err(Error::config("repository name is missing"));
        }
        if self.branch.trim().is_empty() {
            return Err(Error::config("branch is missing"));
        }
        Ok(())
    }

    /// Whether a token is configured
    pub fn has_credentials(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// JSON file holding a saved [`StoreConfig`]
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// Config file at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved config.
    ///
    /// A missing or unreadable-as-JSON file yields `None`.
    pub async fn load(&self) -> Result<Option<StoreConfig>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<StoreConfig>(&raw) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                warn!(path = %self.path.display(), "Ignoring malformed config file: {}", e);
                Ok(None)
            }
        }
    }

    /// Persist the config, creating parent directories as needed
    pub async fn save(&self, config: &StoreConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_and_defaults() {
        let config = StoreConfig::new(" acme ", "plates")
            .with_branch("  ")
            .with_token("");
        assert_eq!(config.owner, "acme");
        assert_eq!(config.branch, "main");
        assert!(!config.has_credentials());
        assert!(config.validate().is_ok());

        let config = config.with_branch("records").with_token("ghp_x");
        assert_eq!(config.branch, "records");
        assert!(config.has_credentials());
    }

    #[test]
    fn test_validate_requires_owner_and_repo() {
        assert!(StoreConfig::new("", "plates").validate().is_err());
        assert!(StoreConfig::new("acme", " ").validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = StoreConfig::new("acme", "plates").with_token("secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_config_file_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = ConfigFile::new(dir.path().join("nested").join("plates.json"));

        assert!(file.load().await?.is_none());

        let config = StoreConfig::new("acme", "plates").with_token("t0k");
        file.save(&config).await?;
        assert_eq!(file.load().await?, Some(config));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_config_file_is_ignored() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("plates.json");
        std::fs::write(&path, "{not json")?;

        assert!(ConfigFile::new(path).load().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_branch_defaults_to_main() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("plates.json");
        std::fs::write(&path, r#"{"owner":"acme","repo":"plates"}"#)?;

        let config = ConfigFile::new(path).load().await?;
        assert_eq!(config.map(|c| c.branch).as_deref(), Some("main"));
        Ok(())
    }
}
