#[cfg(feature = "http")]
pub mod http;
pub mod placeholder;
pub mod traits;

use crate::{config::StudioConfig, error::Result};
use std::sync::Arc;

#[cfg(feature = "http")]
pub use http::HttpBackend;
pub use placeholder::PlaceholderBackend;
pub use traits::{BackendCall, GenerationBackend, ProgressReporter, SeedGenerator};

/// Pick the backend the configuration asks for.
pub fn from_config(config: &StudioConfig) -> Result<Arc<dyn GenerationBackend>> {
    if let Some(http_config) = &config.http {
        #[cfg(feature = "http")]
        {
            return Ok(Arc::new(HttpBackend::new(http_config)?));
        }
        #[cfg(not(feature = "http"))]
        {
            let _ = http_config;
            return Err(crate::error::StudioError::ConfigError(
                "HTTP backend feature not enabled".into(),
            ));
        }
    }

    log::warn!("No backend endpoint configured, falling back to placeholder images");
    Ok(Arc::new(PlaceholderBackend::new()))
}
