pub mod builder;
pub mod invoker;
pub mod packager;
pub mod seed;
pub mod session;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

use crate::{
    backend::{self, GenerationBackend, ProgressReporter},
    config::StudioConfig,
    error::{Result, StudioError},
    models::{GenerationRequest, GenerationResult, ImageArtifact, InferenceInput, StudioEvent},
    presets,
};
use futures::stream::Stream;
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

pub use invoker::{BackendInvoker, Invocation};
pub use packager::ResultPackager;
pub use session::GenerationSession;

/// Entry point the UI talks to: validate, seed, build, invoke, package.
#[derive(Clone)]
pub struct ImageStudio {
    invoker: BackendInvoker,
    config: StudioConfig,
}

impl ImageStudio {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: StudioConfig) -> Self {
        Self {
            invoker: BackendInvoker::new(backend),
            config,
        }
    }

    pub fn from_config(config: StudioConfig) -> Result<Self> {
        let backend = backend::from_config(&config)?;
        Ok(Self::new(backend, config))
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        self.invoker.backend()
    }

    pub fn examples(&self) -> &'static [&'static str] {
        presets::EXAMPLE_PROMPTS
    }

    /// Everything up to the backend call. Fails fast on bad input.
    ///
    /// An empty prompt is reported before any parameter error.
    pub fn prepare(&self, input: &InferenceInput) -> Result<GenerationRequest> {
        if input.prompt.trim().is_empty() {
            return Err(StudioError::EmptyPrompt);
        }
        let params =
            validator::validate(input.width, input.height, input.steps, input.sample_count)?;
        let seeds = seed::resolve_seeds(input.seed_spec(), params.sample_count, self.config.seed_mode);
        builder::build(&input.prompt, params, &seeds, self.config.seed_mode)
    }

    pub async fn generate(&self, input: InferenceInput) -> Result<GenerationResult> {
        self.generate_with_progress(input, ProgressReporter::noop(), CancellationToken::new())
            .await
    }

    pub async fn generate_with_progress(
        &self,
        input: InferenceInput,
        progress: ProgressReporter,
        cancel: CancellationToken,
    ) -> Result<GenerationResult> {
        let request = self.prepare(&input)?;
        log::debug!(
            "Prepared request {}: {}x{}, {} steps, seeds {:?}",
            request.request_id(),
            request.width(),
            request.height(),
            request.steps(),
            request.seeds()
        );

        let invocation = self.invoker.invoke(request, &progress, &cancel).await?;
        let result = ResultPackager::new(invocation.request_id)
            .package(invocation.images, invocation.seeds);

        log::info!(
            "Generated {} image(s), seeds [{}] [req:{}]",
            result.len(),
            result.seeds_display(),
            result.request_id
        );
        Ok(result)
    }

    /// Progress updates followed by exactly one `Finished` event.
    ///
    /// Dropping the stream cancels the request.
    pub fn generate_stream(
        &self,
        input: InferenceInput,
    ) -> Pin<Box<dyn Stream<Item = StudioEvent> + Send>> {
        let (tx, rx) = tokio::sync::mpsc::channel(100);
        let studio = self.clone();
        let cancel = CancellationToken::new();

        let progress_tx = tx.clone();
        let reporter = ProgressReporter::new(move |update| {
            // Progress is best effort; a full channel drops the update.
            let _ = progress_tx.try_send(StudioEvent::Progress(update));
        });

        tokio::spawn(async move {
            let outcome = tokio::select! {
                result = studio.generate_with_progress(input, reporter, cancel.clone()) => Some(result),
                _ = tx.closed() => None,
            };

            match outcome {
                Some(result) => {
                    let _ = tx.send(StudioEvent::Finished(result)).await;
                }
                None => {
                    log::debug!("Stream receiver dropped, cancelling generation");
                    cancel.cancel();
                }
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    /// The UI-facing call: images plus the "Seeds Used" text.
    pub async fn infer(&self, input: InferenceInput) -> Result<(Vec<ImageArtifact>, String)> {
        Ok(self.generate(input).await?.into_display())
    }

    /// Like [`ImageStudio::infer`] for loosely typed form data.
    pub async fn infer_json(&self, input: &Value) -> Result<(Vec<ImageArtifact>, String)> {
        let input = InferenceInput::from_json(input, &self.config.defaults)?;
        self.infer(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeedMode;
    use futures::StreamExt;
    use serde_json::json;
    use super::testing::FakeBackend;

    fn studio(backend: Arc<FakeBackend>) -> ImageStudio {
        ImageStudio::new(backend, StudioConfig::new())
    }

    fn scenario_input() -> InferenceInput {
        InferenceInput::new("a cat holding a sign that says hello world")
            .with_seed(42, false)
            .with_size(1024, 1024)
            .with_steps(4)
            .with_sample_count(3)
    }

    #[tokio::test]
    async fn test_fixed_seed_batch() {
        let backend = Arc::new(FakeBackend::succeeding());
        let result = studio(backend.clone()).generate(scenario_input()).await.unwrap();

        assert_eq!(result.images.len(), 3);
        assert_eq!(result.seeds_used, vec![42, 42, 42]);
        assert_eq!(backend.calls(), 1);

        let call = backend.last_call().unwrap();
        assert_eq!(call.image_count, 3);
        assert_eq!(call.guidance_scale, 0.0);
        assert_eq!((call.width, call.height, call.steps), (1024, 1024, 4));
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::succeeding());
        let input = InferenceInput::new("").with_seed(1, false);
        let err = studio(backend.clone()).generate(input).await.unwrap_err();

        assert!(matches!(err, StudioError::EmptyPrompt));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_prompt_wins_over_bad_params() {
        let backend = Arc::new(FakeBackend::succeeding());
        let input = InferenceInput::new("  ").with_size(-1, 1024).with_steps(-4);
        let err = studio(backend.clone()).generate(input).await.unwrap_err();

        assert!(matches!(err, StudioError::EmptyPrompt));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_width_rounded_before_backend() {
        let backend = Arc::new(FakeBackend::succeeding());
        let input = scenario_input().with_size(1000, 1024);
        studio(backend.clone()).generate(input).await.unwrap();

        assert_eq!(backend.last_call().unwrap().width, 992);
    }

    #[tokio::test]
    async fn test_sample_count_capped() {
        let backend = Arc::new(FakeBackend::succeeding());
        let input = scenario_input().with_sample_count(15);
        let result = studio(backend.clone()).generate(input).await.unwrap();

        assert_eq!(backend.last_image_count(), Some(10));
        assert_eq!(result.images.len(), 10);
        assert_eq!(result.seeds_used.len(), 10);
    }

    #[tokio::test]
    async fn test_backend_failure_returns_no_result() {
        let backend = Arc::new(FakeBackend::failing("invalid size for model"));
        let err = studio(backend).generate(scenario_input()).await.unwrap_err();
        assert!(matches!(err, StudioError::BackendFailure(_)));
    }

    #[tokio::test]
    async fn test_negative_input_rejected_before_backend() {
        let backend = Arc::new(FakeBackend::succeeding());
        let err = studio(backend.clone())
            .generate(scenario_input().with_steps(-4))
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::InvalidParameter { .. }));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_fixed_seed_bookkeeping_is_repeatable() {
        let backend = Arc::new(FakeBackend::succeeding());
        let studio = studio(backend);

        let first = studio.generate(scenario_input()).await.unwrap();
        let second = studio.generate(scenario_input()).await.unwrap();
        assert_eq!(first.seeds_used, second.seeds_used);
    }

    #[tokio::test]
    async fn test_randomized_seed_in_range() {
        let backend = Arc::new(FakeBackend::succeeding());
        let input = scenario_input().with_seed(42, true);
        let result = studio(backend.clone()).generate(input).await.unwrap();

        let seed = result.seeds_used[0];
        assert!(seed <= crate::config::bounds::MAX_SEED);
        assert!(result.seeds_used.iter().all(|s| *s == seed));
        assert_eq!(backend.last_seeds(), result.seeds_used);
    }

    #[tokio::test]
    async fn test_per_image_seeds() {
        let backend = Arc::new(FakeBackend::succeeding());
        let config = StudioConfig::new().with_seed_mode(SeedMode::PerImage);
        let result = ImageStudio::new(backend, config)
            .generate(scenario_input())
            .await
            .unwrap();

        assert_eq!(result.seeds_used, vec![42, 43, 44]);
    }

    #[tokio::test]
    async fn test_per_image_huge_seed_rejected() {
        let backend = Arc::new(FakeBackend::succeeding());
        let config = StudioConfig::new().with_seed_mode(SeedMode::PerImage);
        let input = InferenceInput::new("x")
            .with_seed(i64::MAX, false)
            .with_sample_count(2);
        let err = ImageStudio::new(backend.clone(), config)
            .generate(input)
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::InvalidParameter { ref field, .. } if field == "seed"));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_infer_json() {
        let backend = Arc::new(FakeBackend::succeeding());
        let (images, seeds) = studio(backend)
            .infer_json(&json!({
                "prompt": "an anime illustration of a wiener schnitzel",
                "seed": 7,
                "randomize_seed": false,
                "sample_count": 2
            }))
            .await
            .unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(seeds, "7, 7");
    }

    #[tokio::test]
    async fn test_stream_reports_progress_then_result() {
        let backend = Arc::new(FakeBackend::succeeding());
        let events: Vec<StudioEvent> = studio(backend)
            .generate_stream(scenario_input())
            .collect()
            .await;

        let progress: Vec<f32> = events
            .iter()
            .filter_map(|event| match event {
                StudioEvent::Progress(update) => Some(update.fraction),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![0.25, 0.5, 0.75, 1.0]);

        match events.last() {
            Some(StudioEvent::Finished(Ok(result))) => assert_eq!(result.seeds_used, vec![42, 42, 42]),
            other => panic!("unexpected final event: {:?}", other),
        }
    }

    #[test]
    fn test_examples() {
        let studio = studio(Arc::new(FakeBackend::succeeding()));
        assert_eq!(studio.examples().len(), 3);
    }
}
