use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Source of the bearer token attached to outgoing API requests.
///
/// Injected into the API client at construction so tests can substitute an
/// in-memory store for the on-disk one. `None` means unauthenticated; the
/// server decides what to do with unauthenticated calls.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn token(&self) -> Option<String>;
    async fn set_token(&self, token: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// Token persisted in the user data directory, surviving restarts the way the
/// web client's persistent storage does.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine user data directory"))?;
        Ok(Self {
            path: data_dir.join("teamflow").join("access_token"),
        })
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn token(&self) -> Option<String> {
        let contents = tokio::fs::read_to_string(&self.path).await.ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create credential directory: {}", e))?;
        }
        tokio::fs::write(&self.path, token)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store token: {}", e))?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Failed to clear token: {}", e)),
        }
    }
}
