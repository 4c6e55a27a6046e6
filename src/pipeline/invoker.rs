use crate::{
    backend::{BackendCall, GenerationBackend, ProgressReporter, SeedGenerator},
    error::{Result, StudioError},
    logger,
    models::{GenerationRequest, ImageArtifact},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Backend output for one request, still paired with its seeds.
#[derive(Debug)]
pub struct Invocation {
    pub request_id: Uuid,
    pub images: Vec<ImageArtifact>,
    pub seeds: Vec<u32>,
}

#[derive(Clone)]
pub struct BackendInvoker {
    backend: Arc<dyn GenerationBackend>,
}

impl BackendInvoker {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    /// Run the whole batch as a single backend call.
    ///
    /// No retries. A cancelled token drops the in-flight call and nothing
    /// it produced is returned.
    pub async fn invoke(
        &self,
        request: GenerationRequest,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Invocation> {
        if cancel.is_cancelled() {
            return Err(StudioError::Cancelled);
        }

        let request_id = request.request_id();
        let call = BackendCall::from_request(&request);
        let mut generator = SeedGenerator::for_request(&request);

        log::info!(
            "Invoking {} for {} image(s) at {}, {} steps [req:{}]",
            self.backend.name(),
            call.image_count,
            call.size(),
            call.steps,
            request_id
        );
        let _timer = logger::timer("generate", request_id);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::info!("Generation cancelled, discarding result [req:{}]", request_id);
                return Err(StudioError::Cancelled);
            }
            outcome = self.backend.generate(&call, &mut generator, progress) => outcome,
        };

        let images = outcome.map_err(|e| {
            log::error!("Backend failed: {} [req:{}]", e, request_id);
            match e {
                StudioError::BackendFailure(_) | StudioError::Cancelled => e,
                other => StudioError::BackendFailure(other.to_string()),
            }
        })?;

        if images.len() != call.image_count as usize {
            return Err(StudioError::BackendFailure(format!(
                "Expected {} image(s), backend returned {}",
                call.image_count,
                images.len()
            )));
        }
        if images.iter().any(|image| image.is_empty()) {
            return Err(StudioError::BackendFailure(
                "Backend returned an empty image".into(),
            ));
        }

        Ok(Invocation {
            request_id,
            images,
            seeds: request.seeds().to_vec(),
        })
    }
}
