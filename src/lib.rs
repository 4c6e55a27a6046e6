//! Request orchestration for few-step text-to-image generation.
//!
//! Raw UI input flows through [`pipeline::validator`], [`pipeline::seed`] and
//! [`pipeline::builder`] into a single batched call on a [`GenerationBackend`],
//! and comes back as a [`GenerationResult`] pairing every image with its seed.
pub mod backend;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod presets;

pub use backend::{
    BackendCall, GenerationBackend, PlaceholderBackend, ProgressReporter, SeedGenerator,
};
#[cfg(feature = "http")]
pub use backend::HttpBackend;
pub use config::{bounds, HttpBackendConfig, InputDefaults, StudioConfig};
pub use error::{Result, StudioError};
pub use models::{
    GenerationRequest, GenerationResult, ImageArtifact, ImageFormat, InferenceInput,
    ProgressUpdate, SeedMode, SeedSpec, StudioEvent, ValidatedParams,
};
pub use pipeline::{GenerationSession, ImageStudio};
pub use tokio_util::sync::CancellationToken;
