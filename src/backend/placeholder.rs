use super::traits::{BackendCall, GenerationBackend, ProgressReporter, SeedGenerator};
use crate::{
    error::{Result, StudioError},
    models::{ImageArtifact, ImageFormat},
};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Local stand-in sampler producing seeded gradient images.
///
/// Output depends only on the call and the seeds, so it is suitable for
/// demos and for exercising the pipeline without a model server.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderBackend {
    step_delay: Option<Duration>,
}

impl PlaceholderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep between steps to imitate a real sampler.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    fn render(call: &BackendCall, generator: &mut SeedGenerator, index: usize) -> Result<Vec<u8>> {
        let rng = generator.rng(index).ok_or_else(|| {
            StudioError::BackendFailure(format!("No seed generator for image {}", index))
        })?;

        let tint: [u8; 3] = rng.gen();
        let (width, height) = (call.width as usize, call.height as usize);
        let mut data = Vec::with_capacity(width * height * 3);

        for y in 0..height {
            for x in 0..width {
                let r = ((x * 255) / width.max(1)) as u8;
                let g = ((y * 255) / height.max(1)) as u8;
                let noise: u8 = rng.gen_range(0..32);
                data.push(r / 2 + tint[0] / 2);
                data.push(g / 2 + tint[1] / 2);
                data.push(tint[2] / 2 + noise);
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl GenerationBackend for PlaceholderBackend {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn generate(
        &self,
        call: &BackendCall,
        generator: &mut SeedGenerator,
        progress: &ProgressReporter,
    ) -> Result<Vec<ImageArtifact>> {
        log::warn!("Using placeholder backend, images are gradients");

        for step in 1..=call.steps {
            match self.step_delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
            progress.report(step, call.steps);
        }

        let mut images = Vec::with_capacity(call.image_count as usize);
        for index in 0..call.image_count as usize {
            let data = Self::render(call, generator, index)?;
            images.push(ImageArtifact::new(data, call.width, call.height, ImageFormat::Rgb8));
            // Rendering is CPU bound; give cancellation a chance between images.
            tokio::task::yield_now().await;
        }

        Ok(images)
    }
}
