//! Photo memories: a titled post owning an ordered list of images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::{PairDaysError, PairDaysResult};

/// A memory post. `images` is not a column of the `memories` table; the feed
/// fills it in from `memory_images`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub images: Vec<MemoryImage>,
}

impl Memory {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// One image of a memory. `memory_id` points back at the parent post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryImage {
    pub id: Uuid,
    pub memory_id: Uuid,
    /// Public URL of the stored object
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

/// Row written to `memories` on create; `created_at` is filled by the backend.
#[derive(Debug, Serialize)]
pub(crate) struct NewMemoryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
}

/// Row written to `memory_images` after a successful upload.
#[derive(Debug, Serialize)]
pub(crate) struct NewMemoryImageRow<'a> {
    pub id: Uuid,
    pub memory_id: Uuid,
    pub image_path: &'a str,
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        UploadFile {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> PairDaysResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PairDaysError::Validation(format!("Not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path)?;
        let content_type = content_type_for(&file_name).to_string();

        Ok(UploadFile {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Storage key: a fresh uuid prefix keeps same-named files apart.
    pub fn storage_key(&self) -> String {
        let safe_name: String = self
            .file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}-{}", Uuid::new_v4(), safe_name)
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
