//! In-memory artifact store.

use super::{
    Artifact, ArtifactRecord, ArtifactStore, BoxFuture, RecordId, ServiceError, ServiceResult,
    sort_records,
};
use crate::surface::ExportedImage;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<HashMap<RecordId, Artifact>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Other(format!("Lock error: {}", e))
}

impl ArtifactStore for MemoryArtifactStore {
    fn save(&self, title: &str, image: &ExportedImage) -> BoxFuture<'_, ServiceResult<ArtifactRecord>> {
        let record = ArtifactRecord::new(title, image);
        let png = image.bytes().to_vec();
        Box::pin(async move {
            let mut artifacts = self.artifacts.write().map_err(lock_error)?;
            artifacts.insert(
                record.id,
                Artifact {
                    record: record.clone(),
                    png,
                },
            );
            Ok(record)
        })
    }

    fn load(&self, id: RecordId) -> BoxFuture<'_, ServiceResult<Artifact>> {
        Box::pin(async move {
            let artifacts = self.artifacts.read().map_err(lock_error)?;
            artifacts
                .get(&id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(id.to_string()))
        })
    }

    fn list(&self) -> BoxFuture<'_, ServiceResult<Vec<ArtifactRecord>>> {
        Box::pin(async move {
            let artifacts = self.artifacts.read().map_err(lock_error)?;
            let mut records: Vec<_> = artifacts.values().map(|a| a.record.clone()).collect();
            sort_records(&mut records);
            Ok(records)
        })
    }

    fn delete(&self, id: RecordId) -> BoxFuture<'_, ServiceResult<()>> {
        Box::pin(async move {
            let mut artifacts = self.artifacts.write().map_err(lock_error)?;
            artifacts.remove(&id);
            Ok(())
        })
    }
}
