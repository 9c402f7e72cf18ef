//! Read-only store for the public assets directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{Result, ServerError};

#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a request path onto a file below the root.
    ///
    /// Rejects `.`/`..` segments, backslashes and NUL bytes so a request can
    /// never name a file outside the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = path.trim_start_matches('/');

        if relative.is_empty() || relative.contains(['\\', '\0']) {
            return Err(ServerError::ResourceNotFound(path.to_string()));
        }

        let mut resolved = self.root.clone();
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(ServerError::ResourceNotFound(path.to_string()));
            }
            resolved.push(segment);
        }

        Ok(resolved)
    }

    pub async fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let file = self.resolve(path)?;

        tokio::fs::read(&file).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::IsADirectory => {
                ServerError::ResourceNotFound(path.to_string())
            }
            _ => ServerError::Io(e),
        })
    }

    /// Reads a UTF-8 asset verbatim, line breaks included.
    pub async fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path).await?;

        String::from_utf8(bytes).map_err(|e| {
            ServerError::Io(std::io::Error::new(ErrorKind::InvalidData, e))
        })
    }
}
