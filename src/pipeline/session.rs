use super::ImageStudio;
use crate::{
    backend::ProgressReporter,
    error::{Result, StudioError},
    models::{GenerationResult, InferenceInput},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};
use tokio_util::sync::CancellationToken;

/// One user's generation slot: at most one request in flight.
///
/// Submitting again cancels the previous request, whose result is then
/// discarded even if the backend already finished it.
pub struct GenerationSession {
    studio: ImageStudio,
    next_ticket: AtomicU64,
    current: Mutex<Option<(u64, CancellationToken)>>,
}

impl GenerationSession {
    pub fn new(studio: ImageStudio) -> Self {
        Self {
            studio,
            next_ticket: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn studio(&self) -> &ImageStudio {
        &self.studio
    }

    pub async fn submit(&self, input: InferenceInput) -> Result<GenerationResult> {
        self.submit_with_progress(input, ProgressReporter::noop())
            .await
    }

    pub async fn submit_with_progress(
        &self,
        input: InferenceInput,
        progress: ProgressReporter,
    ) -> Result<GenerationResult> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();

        if let Some((previous, prev_token)) = self.slot().replace((ticket, token.clone())) {
            log::info!("Superseding in-flight request #{}", previous);
            prev_token.cancel();
        }

        let result = self
            .studio
            .generate_with_progress(input, progress, token.clone())
            .await;

        {
            let mut slot = self.slot();
            if matches!(*slot, Some((current, _)) if current == ticket) {
                *slot = None;
            }
        }

        if token.is_cancelled() {
            return Err(StudioError::Cancelled);
        }
        result
    }

    /// Cancel whatever is in flight. Returns whether anything was.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<(u64, CancellationToken)>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
