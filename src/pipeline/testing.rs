use crate::{
    backend::{BackendCall, GenerationBackend, ProgressReporter, SeedGenerator},
    error::{Result, StudioError},
    models::{ImageArtifact, ImageFormat},
};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

enum Behavior {
    Succeed,
    Fail(String),
    ShortByOne,
    Hang,
    HangFirst,
}

/// Scriptable backend that records how it was called.
pub struct FakeBackend {
    behavior: Behavior,
    calls: AtomicUsize,
    last_call: Mutex<Option<BackendCall>>,
    last_seeds: Mutex<Vec<u32>>,
}

impl FakeBackend {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
            last_seeds: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    pub fn short_by_one() -> Self {
        Self::with_behavior(Behavior::ShortByOne)
    }

    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    /// Never finishes the first call, succeeds afterwards.
    pub fn hanging_first() -> Self {
        Self::with_behavior(Behavior::HangFirst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<BackendCall> {
        self.last_call.lock().unwrap().clone()
    }

    pub fn last_image_count(&self) -> Option<u32> {
        self.last_call().map(|call| call.image_count)
    }

    pub fn last_seeds(&self) -> Vec<u32> {
        self.last_seeds.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(
        &self,
        call: &BackendCall,
        generator: &mut SeedGenerator,
        progress: &ProgressReporter,
    ) -> Result<Vec<ImageArtifact>> {
        let previous_calls = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some(call.clone());
        *self.last_seeds.lock().unwrap() = generator.seeds().to_vec();

        let count = match &self.behavior {
            Behavior::Succeed => call.image_count,
            Behavior::ShortByOne => call.image_count.saturating_sub(1),
            Behavior::Fail(message) => return Err(StudioError::RequestError(message.clone())),
            Behavior::Hang => std::future::pending::<u32>().await,
            Behavior::HangFirst if previous_calls == 0 => std::future::pending::<u32>().await,
            Behavior::HangFirst => call.image_count,
        };

        for step in 1..=call.steps {
            progress.report(step, call.steps);
        }

        Ok((0..count)
            .map(|i| ImageArtifact::new(vec![i as u8 + 1], call.width, call.height, ImageFormat::Png))
            .collect())
    }
}
