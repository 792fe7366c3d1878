//! Cyclic cursor over a session's files and per-item delivery.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Error;
use crate::mime::data_uri;

/// One delivered item: display name plus inline data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub file_name: String,
    pub file_content: String,
}

/// A ring over file paths. `cursor` always indexes into `files` unless
/// `files` is empty, in which case it is zero.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    files: Vec<PathBuf>,
    cursor: usize,
    last_served: Option<PathBuf>,
}

impl Playlist {
    #[must_use]
    pub fn from_vec(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            cursor: 0,
            last_served: None,
        }
    }

    /// Swap in a freshly scanned list without rewinding. A cursor that no
    /// longer fits restarts from the top.
    pub fn replace(&mut self, files: Vec<PathBuf>) {
        self.files = files;
        if self.cursor >= self.files.len() {
            self.cursor = 0;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Borrow the current item without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<&PathBuf> {
        self.files.get(self.cursor)
    }

    /// Path handed out by the most recent successful [`Playlist::next`].
    #[must_use]
    pub fn last_served(&self) -> Option<&Path> {
        self.last_served.as_deref()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.files
    }

    /// Move past the current item, wrapping at the end.
    pub fn advance(&mut self) {
        if self.files.is_empty() {
            self.cursor = 0;
        } else {
            self.cursor = (self.cursor + 1) % self.files.len();
        }
    }

    /// Read and encode the current file, then advance.
    ///
    /// # Errors
    /// [`Error::NoDataAvailable`] when the list is empty and
    /// [`Error::FileRead`] when the file cannot be read; the cursor stays put
    /// in both cases.
    pub async fn next(&mut self, client_id: &str) -> Result<Delivery, Error> {
        let Some(path) = self.peek().cloned() else {
            return Err(Error::NoDataAvailable {
                client_id: client_id.to_string(),
            });
        };

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| Error::FileRead {
                path: path.clone(),
                source,
            })?;

        let file_name = path.to_string_lossy().into_owned();
        let file_content = data_uri(&file_name, &bytes);
        info!(
            client_id,
            index = self.cursor,
            file_name = %file_name,
            "sending"
        );

        self.advance();
        self.last_served = Some(path);
        Ok(Delivery {
            file_name,
            file_content,
        })
    }
}
