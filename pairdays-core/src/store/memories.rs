//! Photo memories feed.

use std::collections::HashMap;
use uuid::Uuid;

use crate::constants::{DEFAULT_IMAGE_BUCKET, MEMORIES_TABLE, MEMORY_IMAGES_TABLE};
use crate::error::{PairDaysError, PairDaysResult};
use crate::gateway::{Gateway, Query, decode_rows, encode_row};
use crate::memory::{Memory, MemoryImage, NewMemoryImageRow, NewMemoryRow, UploadFile};
use crate::store::{id_value, require_user};

/// Result of creating a memory. The post itself was stored; any image that
/// couldn't be uploaded or attached is listed in `skipped`.
#[derive(Debug)]
pub struct MemoryCreated {
    pub memory: Memory,
    pub skipped: Vec<SkippedUpload>,
}

impl MemoryCreated {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedUpload {
    pub file_name: String,
    pub reason: String,
}

pub struct MemoryFeed<G: Gateway> {
    gateway: G,
    bucket: String,
    memories: Vec<Memory>,
}

impl<G: Gateway> MemoryFeed<G> {
    pub fn new(gateway: G) -> Self {
        MemoryFeed {
            gateway,
            bucket: DEFAULT_IMAGE_BUCKET.to_string(),
            memories: Vec::new(),
        }
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = bucket.to_string();
        self
    }

    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    pub fn find(&self, id: Uuid) -> Option<&Memory> {
        self.memories.iter().find(|m| m.id == id)
    }

    /// Load the signed-in user's memories, newest first, each with its images
    /// in upload order. Empty when signed out.
    pub async fn list(&mut self) -> PairDaysResult<&[Memory]> {
        let Some(user) = self.gateway.current_user().await? else {
            self.memories.clear();
            return Ok(&self.memories);
        };

        let rows = self
            .gateway
            .select(
                &Query::table(MEMORIES_TABLE)
                    .eq("user_id", id_value(user.id))
                    .order_desc("created_at"),
            )
            .await?;
        let mut memories: Vec<Memory> = decode_rows(rows)?;

        if !memories.is_empty() {
            let ids: Vec<_> = memories.iter().map(|m| id_value(m.id)).collect();
            let rows = self
                .gateway
                .select(
                    &Query::table(MEMORY_IMAGES_TABLE)
                        .is_in("memory_id", ids)
                        .order_asc("created_at"),
                )
                .await?;

            let mut by_memory: HashMap<Uuid, Vec<MemoryImage>> = HashMap::new();
            for image in decode_rows::<MemoryImage>(rows)? {
                by_memory.entry(image.memory_id).or_default().push(image);
            }
            for memory in &mut memories {
                memory.images = by_memory.remove(&memory.id).unwrap_or_default();
            }
        }

        self.memories = memories;
        tracing::debug!(count = self.memories.len(), "loaded memories");
        Ok(&self.memories)
    }

    /// Images attached to one memory, in upload order.
    pub async fn images(&self, memory_id: Uuid) -> PairDaysResult<Vec<MemoryImage>> {
        let rows = self
            .gateway
            .select(
                &Query::table(MEMORY_IMAGES_TABLE)
                    .eq("memory_id", id_value(memory_id))
                    .order_asc("created_at"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Store the post, then upload and attach each file on its own. A file
    /// that fails doesn't stop the others; it's reported in the result.
    pub async fn create(
        &mut self,
        title: &str,
        description: Option<&str>,
        files: Vec<UploadFile>,
    ) -> PairDaysResult<MemoryCreated> {
        let user = require_user(&self.gateway).await?;

        let row = NewMemoryRow {
            id: Uuid::new_v4(),
            user_id: user.id,
            title,
            description: description.map(str::trim).filter(|d| !d.is_empty()),
        };
        let stored = self
            .gateway
            .insert(MEMORIES_TABLE, vec![encode_row(&row)?])
            .await?;
        let mut memory: Memory = stored
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| PairDaysError::Gateway("insert returned no memory row".into()))?;
        tracing::info!(id = %memory.id, files = files.len(), "created memory");

        let mut skipped = Vec::new();
        for file in files {
            match self.attach(memory.id, &file).await {
                Ok(image) => memory.images.push(image),
                Err(e) => {
                    tracing::warn!(memory = %memory.id, file = %file.file_name, error = %e, "image skipped");
                    skipped.push(SkippedUpload {
                        file_name: file.file_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.reload().await;
        Ok(MemoryCreated { memory, skipped })
    }

    async fn attach(&self, memory_id: Uuid, file: &UploadFile) -> PairDaysResult<MemoryImage> {
        let key = file.storage_key();
        self.gateway
            .upload(&self.bucket, &key, &file.content_type, file.bytes.clone())
            .await?;

        let url = self.gateway.public_url(&self.bucket, &key);
        let row = NewMemoryImageRow {
            id: Uuid::new_v4(),
            memory_id,
            image_path: &url,
        };
        let stored = self
            .gateway
            .insert(MEMORY_IMAGES_TABLE, vec![encode_row(&row)?])
            .await?;

        stored
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| PairDaysError::Gateway("insert returned no image row".into()))
    }

    /// Delete a memory the signed-in user owns: its images first, then the
    /// post. Nothing is rolled back if the second step fails.
    pub async fn delete(&mut self, id: Uuid) -> PairDaysResult<()> {
        let user = require_user(&self.gateway).await?;

        let owned = Query::table(MEMORIES_TABLE)
            .eq("id", id_value(id))
            .eq("user_id", id_value(user.id));

        // Check ownership before removing any images.
        if self.gateway.select(&owned).await?.is_empty() {
            return Err(PairDaysError::NotFound(format!("memory {id}")));
        }

        let images_removed = self
            .gateway
            .delete(&Query::table(MEMORY_IMAGES_TABLE).eq("memory_id", id_value(id)))
            .await?;

        let removed = self.gateway.delete(&owned).await?;
        if removed == 0 {
            return Err(PairDaysError::NotFound(format!("memory {id}")));
        }
        tracing::info!(%id, images = images_removed, "deleted memory");

        self.reload().await;
        Ok(())
    }

    /// Reload after a committed write. The post and its images are stored
    /// whatever happens here; a failure only leaves the snapshot stale.
    async fn reload(&mut self) {
        if let Err(e) = self.list().await {
            tracing::warn!(error = %e, "reload after write failed, memories list is stale");
        }
    }
}
