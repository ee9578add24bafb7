//! Collaborator interfaces: art generation and artifact storage.
//!
//! The canvas itself persists nothing. A finished doodle is handed to an
//! [`ArtifactStore`] and optionally to a [`GenerationService`] that turns it
//! into a styled picture.

mod file;
mod memory;

pub use file::FileArtifactStore;
pub use memory::MemoryArtifactStore;

use crate::surface::ExportedImage;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Collaborator errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Service error: {0}")]
    Other(String),
}

/// Result type for collaborator operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Boxed future for collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Identifier of a stored artifact.
pub type RecordId = Uuid;

/// Picture style requested from the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    #[default]
    Realistic,
    Cartoon,
    Watercolor,
    Pixel,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 4] = [
        ArtStyle::Realistic,
        ArtStyle::Cartoon,
        ArtStyle::Watercolor,
        ArtStyle::Pixel,
    ];

    /// Display name for the style picker.
    pub fn name(&self) -> &'static str {
        match self {
            ArtStyle::Realistic => "Realistic",
            ArtStyle::Cartoon => "Cartoon",
            ArtStyle::Watercolor => "Watercolor",
            ArtStyle::Pixel => "Pixel Art",
        }
    }

    /// Cycle to the next style.
    pub fn next(self) -> Self {
        match self {
            ArtStyle::Realistic => ArtStyle::Cartoon,
            ArtStyle::Cartoon => ArtStyle::Watercolor,
            ArtStyle::Watercolor => ArtStyle::Pixel,
            ArtStyle::Pixel => ArtStyle::Realistic,
        }
    }
}

/// A doodle sent off for generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image: ExportedImage,
    pub style: Option<ArtStyle>,
}

/// What the generation service made of a doodle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub image_url: String,
    pub description: String,
}

/// Turns a doodle into a generated picture.
pub trait GenerationService: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, ServiceResult<GenerationResponse>>;
}

/// Metadata kept alongside a stored doodle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: RecordId,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl ArtifactRecord {
    fn new(title: &str, image: &ExportedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            width: image.width(),
            height: image.height(),
        }
    }
}

/// A stored doodle: its record and PNG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub record: ArtifactRecord,
    pub png: Vec<u8>,
}

/// Storage for finished doodles.
pub trait ArtifactStore: Send + Sync {
    /// Store a doodle under a fresh id.
    fn save(&self, title: &str, image: &ExportedImage) -> BoxFuture<'_, ServiceResult<ArtifactRecord>>;

    fn load(&self, id: RecordId) -> BoxFuture<'_, ServiceResult<Artifact>>;

    /// Records of every stored doodle, ordered by title.
    fn list(&self) -> BoxFuture<'_, ServiceResult<Vec<ArtifactRecord>>>;

    /// Remove a doodle. Deleting an unknown id is not an error.
    fn delete(&self, id: RecordId) -> BoxFuture<'_, ServiceResult<()>>;
}

fn sort_records(records: &mut [ArtifactRecord]) {
    records.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
}
