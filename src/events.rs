use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;

/// Opaque identifier of one widget instance.
pub type ClientId = String;

/// Widget -> helper.
///
/// Serialized as `{"notification": NAME, "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notification", content = "payload")]
pub enum HelperRequest {
    #[serde(rename = "BUILD_FILE_LIST")]
    BuildFileList {
        client_id: ClientId,
        config: WidgetConfig,
    },
    #[serde(rename = "RETRIEVE_DATA_URL")]
    RetrieveDataUrl {
        client_id: ClientId,
        config: WidgetConfig,
    },
}

impl HelperRequest {
    pub fn client_id(&self) -> &str {
        match self {
            Self::BuildFileList { client_id, .. } | Self::RetrieveDataUrl { client_id, .. } => {
                client_id
            }
        }
    }

    pub fn notification(&self) -> &'static str {
        match self {
            Self::BuildFileList { .. } => "BUILD_FILE_LIST",
            Self::RetrieveDataUrl { .. } => "RETRIEVE_DATA_URL",
        }
    }
}

/// Helper -> widget(s). Broadcast to every widget; each one keeps only the
/// events that concern it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notification", content = "payload")]
pub enum HelperEvent {
    #[serde(rename = "NODE_HELPER_FILE_COUNT")]
    FileCount {
        client_id: ClientId,
        file_count: usize,
    },
    #[serde(rename = "NODE_HELPER_DATA_URL")]
    DataUrl {
        client_id: ClientId,
        file_name: String,
        file_content: String,
    },
    #[serde(rename = "NODE_HELPER_STOP")]
    Stop {},
}

impl HelperEvent {
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::FileCount { client_id, .. } | Self::DataUrl { client_id, .. } => Some(client_id),
            Self::Stop {} => None,
        }
    }

    /// `Stop` concerns every widget.
    pub fn concerns(&self, client_id: &str) -> bool {
        self.client_id().is_none_or(|id| id == client_id)
    }
}

/// Host lifecycle signals delivered to a widget after it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Suspend,
    Resume,
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub name: String,
    pub data_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub entry: &'static str,
    pub exit: &'static str,
    pub speed: Duration,
}

/// Emitted by a widget whenever the external renderer should repaint it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderUpdate {
    pub client_id: ClientId,
    pub header: String,
    pub content: Option<Content>,
    /// `None` for status-only repaints (suspend, helper stop).
    pub transition: Option<Transition>,
}
