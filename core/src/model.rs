//! Image records as exported by the admin API

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single image in the library
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Server-side identifier
    pub id: u64,

    /// Full path name, e.g. `banners/summer/hero.png`
    pub fullname: String,

    /// Tags attached to the image; `None` means untagged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Who uploaded the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,

    /// Creation timestamp as sent by the server (not guaranteed to parse)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    /// Storage size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<u64>,
}

impl ImageRecord {
    /// Create a new untagged record
    pub fn new(id: u64, fullname: impl Into<String>) -> Self {
        Self {
            id,
            fullname: fullname.into(),
            ..Self::default()
        }
    }

    /// Set the tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Set the creation timestamp
    pub fn with_at(mut self, at: impl Into<String>) -> Self {
        self.at = Some(at.into());
        self
    }

    /// Set pixel dimensions
    pub fn with_dimensions(mut self, width: u64, height: u64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set storage size
    pub fn with_disk_size(mut self, disk_size: u64) -> Self {
        self.disk_size = Some(disk_size);
        self
    }
}

/// Kind of change recorded in an image's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Create,
    Rename,
    Replace,
    Delete,
    Restore,
}

impl ActionType {
    /// Get the action name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Create => "create",
            ActionType::Rename => "rename",
            ActionType::Replace => "replace",
            ActionType::Delete => "delete",
            ActionType::Restore => "restore",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an image's change history, also used for the trash view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHistory {
    pub id: u64,
    pub at: String,
    pub fullname: String,
    /// Name of the backup copy kept for replaced or deleted images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_fullname: Option<String>,
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
}
