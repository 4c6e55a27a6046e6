use crate::{
    error::Result,
    models::{GenerationRequest, ImageArtifact, ProgressUpdate, SeedMode},
};
use async_trait::async_trait;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The outbound call contract: everything a sampler needs except the seeds,
/// which travel in the [`SeedGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendCall {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub guidance_scale: f32,
    pub image_count: u32,
}

impl BackendCall {
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            prompt: request.prompt().to_string(),
            width: request.width(),
            height: request.height(),
            steps: request.steps(),
            guidance_scale: request.guidance_scale(),
            image_count: request.sample_count(),
        }
    }

    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Deterministic random state for one invocation.
///
/// Each underlying generator is seeded exactly once, on construction. In
/// per-batch mode a single generator is shared by every image of the batch.
pub struct SeedGenerator {
    seeds: Vec<u32>,
    rngs: Vec<StdRng>,
}

impl SeedGenerator {
    pub fn new(seeds: &[u32], mode: SeedMode) -> Self {
        let rngs = match mode {
            SeedMode::PerBatch => seeds
                .first()
                .map(|seed| vec![StdRng::seed_from_u64(*seed as u64)])
                .unwrap_or_default(),
            SeedMode::PerImage => seeds
                .iter()
                .map(|seed| StdRng::seed_from_u64(*seed as u64))
                .collect(),
        };

        Self {
            seeds: seeds.to_vec(),
            rngs,
        }
    }

    pub fn for_request(request: &GenerationRequest) -> Self {
        Self::new(request.seeds(), request.seed_mode())
    }

    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    pub fn is_shared(&self) -> bool {
        self.rngs.len() == 1
    }

    /// Random state driving the image at `index`.
    pub fn rng(&mut self, index: usize) -> Option<&mut StdRng> {
        if self.is_shared() {
            self.rngs.first_mut()
        } else {
            self.rngs.get_mut(index)
        }
    }
}

impl fmt::Debug for SeedGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedGenerator")
            .field("seeds", &self.seeds)
            .field("generators", &self.rngs.len())
            .finish()
    }
}

type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Explicit progress side channel handed to the backend.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    pub fn noop() -> Self {
        Self::default()
    }

    pub fn report(&self, step: u32, total_steps: u32) {
        if let Some(callback) = &self.callback {
            callback(ProgressUpdate::new(step, total_steps));
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("attached", &self.callback.is_some())
            .finish()
    }
}

/// A text-to-image sampler. Loaded once, shared by every request.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Produce `call.image_count` images in a single call, in order.
    async fn generate(
        &self,
        call: &BackendCall,
        generator: &mut SeedGenerator,
        progress: &ProgressReporter,
    ) -> Result<Vec<ImageArtifact>>;

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
