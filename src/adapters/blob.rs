use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    #[error("blob storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob backend error: {0}")]
    Backend(String),
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::InvalidPath(path) => AppError::InvalidArgument(format!("invalid storage path {path}")),
            other => AppError::ExternalWriteFailed(other.to_string()),
        }
    }
}

/// Object storage holding uploaded document bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `content` and returns an opaque storage path for it.
    async fn put(&self, content: Bytes, file_name: &str, owner: &str) -> Result<String, BlobError>;

    async fn delete(&self, storage_path: &str) -> Result<(), BlobError>;
}

/// Filesystem-backed blob store. Objects live under `<base>/<owner>/`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, storage_path: &str) -> Result<PathBuf, BlobError> {
        if storage_path.is_empty() {
            return Err(BlobError::InvalidPath("storage path cannot be empty".into()));
        }
        let relative = Path::new(storage_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(BlobError::InvalidPath(storage_path.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, content: Bytes, file_name: &str, owner: &str) -> Result<String, BlobError> {
        let owner_dir = sanitize_file_name(owner);
        let object_name = unique_object_name(file_name);
        let storage_path = format!("{owner_dir}/{object_name}");

        fs::create_dir_all(self.base_path.join(&owner_dir)).await?;
        let full_path = self.resolve(&storage_path)?;

        // The handle is closed when this block ends, on success and on error.
        let written = {
            let mut file = fs::File::create(&full_path).await?;
            match file.write_all(&content).await {
                Ok(()) => file.sync_all().await,
                Err(err) => Err(err),
            }
        };

        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&full_path).await {
                tracing::warn!(path = %full_path.display(), error = %cleanup, "failed to remove partial upload");
            }
            return Err(err.into());
        }

        tracing::info!(
            file_name,
            owner,
            storage_path = %storage_path,
            bytes = content.len(),
            "file stored"
        );
        Ok(storage_path)
    }

    async fn delete(&self, storage_path: &str) -> Result<(), BlobError> {
        let full_path = self.resolve(storage_path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::info!(storage_path, "file deleted");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(storage_path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Replaces anything outside `[A-Za-z0-9._-]` with `_`, collapsing runs and
/// trimming leading/trailing `_` and `.`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        let keep = c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
        if keep {
            sanitized.push(c);
        } else if !sanitized.ends_with('_') {
            sanitized.push('_');
        }
    }
    let trimmed = sanitized.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unique_object_name(file_name: &str) -> String {
    let sanitized = sanitize_file_name(file_name);
    let (stem, ext) = match sanitized.rfind('.') {
        Some(idx) if idx > 0 => sanitized.split_at(idx),
        _ => (sanitized.as_str(), ""),
    };
    let suffix: [u8; 8] = rand::random();
    let suffix: String = suffix.iter().map(|b| format!("{b:02x}")).collect();
    format!("{stem}_{}_{suffix}{ext}", Utc::now().timestamp())
}
