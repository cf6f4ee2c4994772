use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::StoreSettings;
use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Debug, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read subscriber document {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("subscriber document {} is not a valid subscriber list", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode subscriber list")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write subscriber document {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Subscriber list kept as a single JSON document on disk.
///
/// Every mutation reads the whole document, changes it in memory and replaces the file through
/// a temp file and a rename, so readers never observe a half written document. The mutex makes
/// this process the only writer; other processes writing the same file are not coordinated.
pub struct SubscriberStore {
    path: PathBuf,
    source: String,
    lock: Mutex<()>,
}

impl SubscriberStore {
    pub fn new(settings: &StoreSettings) -> Self {
        SubscriberStore {
            path: settings.path.clone(),
            source: settings.source.clone(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the document with an empty list unless it already exists.
    #[tracing::instrument(
        name = "Initialize subscriber store",
        skip(self),
        fields(path = %self.path.display())
    )]
    pub async fn ensure_initialized(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        if exists {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        self.write_all(&[]).await?;
        tracing::info!("Created empty subscriber store");

        Ok(())
    }

    #[tracing::instrument(
        name = "Store a subscriber",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn subscribe(&self, email: &SubscriberEmail) -> Result<SubscribeOutcome, StoreError> {
        let _guard = self.lock.lock().await;

        let mut subscribers = self.read_all().await?;

        if subscribers.iter().any(|s| email.matches(&s.email)) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        subscribers.push(Subscriber::new(email, &self.source));
        self.write_all(&subscribers).await?;
        tracing::info!(total = subscribers.len(), "New subscriber stored");

        Ok(SubscribeOutcome::Subscribed)
    }

    /// Current list in insertion order
    pub async fn subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        let _guard = self.lock.lock().await;

        self.read_all().await
    }

    async fn read_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_slice(&raw).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, subscribers: &[Subscriber]) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(subscribers).map_err(StoreError::Encode)?;

        // Sibling of the target so the rename stays on the same filesystem
        let temp_path = self.temp_path();

        if let Err(source) = tokio::fs::write(&temp_path, payload).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::Write {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::Write {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "subscribers".to_string());

        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }
}
