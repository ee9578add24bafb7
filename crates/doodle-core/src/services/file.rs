//! File-based artifact store.

use super::{
    Artifact, ArtifactRecord, ArtifactStore, BoxFuture, RecordId, ServiceError, ServiceResult,
    sort_records,
};
use crate::surface::ExportedImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each doodle as `<title>-<id>.png` with a `<title>-<id>.json` record beside it.
#[derive(Debug)]
pub struct FileArtifactStore {
    base_path: PathBuf,
}

impl FileArtifactStore {
    /// Create a store in `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> ServiceResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                ServiceError::Io(format!("Failed to create artifact directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a store in the default location.
    ///
    /// On Unix: `~/.local/share/doodle/artifacts/`
    /// On Windows: `%LOCALAPPDATA%\doodle\artifacts\`
    pub fn default_location() -> ServiceResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| ServiceError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("doodle").join("artifacts"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File stem shared by the image and its record.
    fn stem(record: &ArtifactRecord) -> String {
        format!("{}-{}", sanitize_title(&record.title), record.id)
    }

    /// Path of the PNG for a record.
    pub fn image_path(&self, record: &ArtifactRecord) -> PathBuf {
        self.base_path.join(format!("{}.png", Self::stem(record)))
    }

    fn record_path(&self, record: &ArtifactRecord) -> PathBuf {
        self.base_path.join(format!("{}.json", Self::stem(record)))
    }

    fn read_record(path: &Path) -> ServiceResult<ArtifactRecord> {
        let json = fs::read_to_string(path).map_err(|e| {
            ServiceError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            ServiceError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Every record in the directory. Unreadable sidecars are skipped.
    fn records(base: &Path) -> ServiceResult<Vec<ArtifactRecord>> {
        if !base.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(base)
            .map_err(|e| ServiceError::Io(format!("Failed to read directory: {}", e)))?;

        let mut records = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match Self::read_record(&path) {
                    Ok(record) => records.push(record),
                    Err(e) => log::warn!("Skipping artifact record: {}", e),
                }
            }
        }
        Ok(records)
    }

    fn find(&self, id: RecordId) -> ServiceResult<ArtifactRecord> {
        Self::records(&self.base_path)?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }
}

impl ArtifactStore for FileArtifactStore {
    fn save(&self, title: &str, image: &ExportedImage) -> BoxFuture<'_, ServiceResult<ArtifactRecord>> {
        let record = ArtifactRecord::new(title, image);
        let image_path = self.image_path(&record);
        let record_path = self.record_path(&record);
        let png = image.bytes().to_vec();
        let json = match serde_json::to_string_pretty(&record) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(ServiceError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            fs::write(&image_path, png).map_err(|e| {
                ServiceError::Io(format!("Failed to write {}: {}", image_path.display(), e))
            })?;
            fs::write(&record_path, json).map_err(|e| {
                ServiceError::Io(format!("Failed to write {}: {}", record_path.display(), e))
            })?;
            log::info!("Saved doodle to {}", image_path.display());
            Ok(record)
        })
    }

    fn load(&self, id: RecordId) -> BoxFuture<'_, ServiceResult<Artifact>> {
        Box::pin(async move {
            let record = self.find(id)?;
            let path = self.image_path(&record);
            let png = fs::read(&path).map_err(|e| {
                ServiceError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Ok(Artifact { record, png })
        })
    }

    fn list(&self) -> BoxFuture<'_, ServiceResult<Vec<ArtifactRecord>>> {
        Box::pin(async move {
            let mut records = Self::records(&self.base_path)?;
            sort_records(&mut records);
            Ok(records)
        })
    }

    fn delete(&self, id: RecordId) -> BoxFuture<'_, ServiceResult<()>> {
        Box::pin(async move {
            let record = match self.find(id) {
                Ok(record) => record,
                Err(ServiceError::NotFound(_)) => return Ok(()),
                Err(e) => return Err(e),
            };
            for path in [self.image_path(&record), self.record_path(&record)] {
                if path.exists() {
                    fs::remove_file(&path).map_err(|e| {
                        ServiceError::Io(format!("Failed to delete {}: {}", path.display(), e))
                    })?;
                }
            }
            Ok(())
        })
    }
}

/// Make a title safe for use in a file name.
fn sanitize_title(title: &str) -> String {
    let safe: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() {
        "doodle".to_string()
    } else {
        safe
    }
}
