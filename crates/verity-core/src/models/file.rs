use bytes::Bytes;
use serde::Serialize;
use std::path::{Component, Path};

use crate::error::FileError;
use crate::validation::content_type_for_path;

/// The file chosen by the user.
///
/// The payload is reference counted, so cloning a `SelectedFile` into a transfer task
/// does not copy the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    content_type: String,
    data: Bytes,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, naming it after the last path component and inferring its
    /// MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(FileError::InvalidPath(path.display().to_string()));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FileError::InvalidPath(path.display().to_string()))?
            .to_string();

        let data = tokio::fs::read(path).await.map_err(|source| FileError::Read {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(file = %name, size = data.len(), "Read file from disk");

        Ok(Self::new(name, content_type_for_path(path), data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            size: self.size(),
            content_type: self.content_type.clone(),
        }
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

/// Payload-free description of a `SelectedFile`, safe to publish to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}
