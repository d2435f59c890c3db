use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SolverError};

/// Directory of rendered answer images, one file per distinct query text.
///
/// Entries are never invalidated: an image fetched once is served for as
/// long as the directory exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache rooted in the system temp directory.
    pub fn temp() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, query: &str) -> PathBuf {
        self.dir.join(file_name_for(query))
    }

    pub fn contains(&self, query: &str) -> bool {
        self.path_for(query).is_file()
    }

    /// Write `bytes` as the image for `query`, overwriting any previous file.
    pub async fn store(&self, query: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(query);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SolverError::Io {
                path: self.dir.clone(),
                source,
            })?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| SolverError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = bytes.len(), "stored answer image");
        Ok(path)
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::temp()
    }
}

fn file_name_for(query: &str) -> String {
    let stem: String = query
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{stem}.gif")
}
