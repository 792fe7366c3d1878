use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{info, instrument};

use crate::config::WidgetConfig;
use crate::error::Error;
use crate::events::ClientId;
use crate::playback::{Delivery, Playlist};
use crate::scanner;

/// Helper-side state for one widget instance.
///
/// Owned by a single task, so every request for the same client runs to
/// completion before the next one starts.
#[derive(Debug)]
pub struct ClientSession {
    client_id: ClientId,
    playlist: Playlist,
    config: Option<WidgetConfig>,
    rng: StdRng,
}

impl ClientSession {
    pub fn new(client_id: impl Into<ClientId>, rng: StdRng) -> Self {
        Self {
            client_id: client_id.into(),
            playlist: Playlist::default(),
            config: None,
            rng,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn files(&self) -> &[PathBuf] {
        self.playlist.as_slice()
    }

    pub fn cursor(&self) -> usize {
        self.playlist.cursor()
    }

    /// Configuration stored by the most recent rebuild.
    pub fn config(&self) -> Option<&WidgetConfig> {
        self.config.as_ref()
    }

    /// Rescan the configured directories and replace the file list.
    ///
    /// Files already known before the scan are not picked up again, so a
    /// rescan of unchanged directories yields an empty list. Returns the new
    /// file count.
    #[instrument(skip_all, fields(client_id = %self.client_id))]
    pub async fn rebuild(&mut self, config: WidgetConfig) -> usize {
        let mut files = scanner::scan(
            config.data_dir_paths.clone(),
            config.allowed_extensions.clone(),
            self.playlist.as_slice().to_vec(),
        )
        .await;
        if config.randomize_images {
            files.shuffle(&mut self.rng);
        }
        self.playlist.replace(files);
        self.config = Some(config);

        let file_count = self.playlist.len();
        info!(file_count, "file count");
        file_count
    }

    /// Deliver the file under the cursor and advance.
    pub async fn next(&mut self) -> Result<Delivery, Error> {
        self.playlist.next(&self.client_id).await
    }
}
