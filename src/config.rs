use crate::{
    error::{Result, StudioError},
    models::SeedMode,
};
use std::env;
use std::time::Duration;

/// Process-wide limits on generation parameters.
pub mod bounds {
    pub const MAX_SEED: u32 = i32::MAX as u32;
    pub const MIN_IMAGE_SIZE: u32 = 256;
    pub const MAX_IMAGE_SIZE: u32 = 2048;
    pub const DIMENSION_STEP: u32 = 32;
    pub const MAX_STEPS: u32 = 50;
    pub const MAX_SAMPLES: u32 = 10;

    /// The few-step distilled model runs without classifier-free guidance.
    pub const GUIDANCE_SCALE: f32 = 0.0;
}

/// Values the UI pre-fills before the user touches anything.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDefaults {
    pub seed: i64,
    pub randomize_seed: bool,
    pub width: i64,
    pub height: i64,
    pub steps: i64,
    pub sample_count: i64,
}

impl Default for InputDefaults {
    fn default() -> Self {
        InputDefaults {
            seed: 0,
            randomize_seed: true,
            width: 1024,
            height: 1024,
            steps: 4,
            sample_count: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub seed_mode: SeedMode,
    pub defaults: InputDefaults,
    pub http: Option<HttpBackendConfig>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            seed_mode: SeedMode::PerBatch,
            defaults: InputDefaults::default(),
            http: None,
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let seed_mode = match env::var("FLUXGEN_SEED_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => SeedMode::PerBatch,
        };

        let http = if env::var("FLUXGEN_ENDPOINT").is_ok() {
            Some(HttpBackendConfig::from_env())
        } else {
            None
        };

        Ok(StudioConfig {
            seed_mode,
            defaults: InputDefaults::default(),
            http,
        })
    }

    pub fn with_seed_mode(mut self, seed_mode: SeedMode) -> Self {
        self.seed_mode = seed_mode;
        self
    }

    pub fn with_defaults(mut self, defaults: InputDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_http(mut self, config: HttpBackendConfig) -> Self {
        self.http = Some(config);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpBackendConfig {
    pub endpoint: Option<String>,
    pub model_name: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl HttpBackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let endpoint = env::var("FLUXGEN_ENDPOINT").ok();
        let model_name = env::var("FLUXGEN_MODEL").ok();
        let timeout_secs = env::var("FLUXGEN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        HttpBackendConfig {
            endpoint,
            model_name,
            timeout_secs,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| StudioError::ConfigError("Backend endpoint is required".into()))
    }

    pub fn model_name(&self) -> &str {
        self.model_name
            .as_deref()
            .unwrap_or("black-forest-labs/FLUX.1-schnell")
    }

    /// Generation is slow; the default leaves room for large batches.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(300))
    }
}
