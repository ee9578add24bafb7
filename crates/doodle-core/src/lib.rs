//! Doodle Core Library
//!
//! Platform-agnostic raster paint engine for the doodle canvas: surface,
//! brushes, pointer input, undo history and the collaborator interfaces a
//! finished doodle is handed to.

pub mod brush;
pub mod color;
pub mod history;
pub mod input;
pub mod services;
pub mod session;
pub mod surface;

pub use brush::{BRUSH_SIZES, BrushEngine, BrushMode, BrushStyle, MAX_WIDTH, Shadow};
pub use color::{ColorError, PALETTE, Rgba, Swatch};
pub use history::{History, HistoryConfig, HistoryEntry};
pub use input::{InputError, InputUnifier, MouseButton, PointerEvent, Sample, StrokeEvent, Touch};
pub use services::{
    ArtStyle, Artifact, ArtifactRecord, ArtifactStore, FileArtifactStore, GenerationRequest,
    GenerationResponse, GenerationService, MemoryArtifactStore, RecordId, ServiceError,
};
pub use session::{
    CompletedDoodle, CompletionSink, DoodleSession, SessionConfig, SessionError, SessionState,
};
pub use surface::{ExportedImage, Surface, SurfaceError};
