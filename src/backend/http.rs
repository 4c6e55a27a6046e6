use super::traits::{BackendCall, GenerationBackend, ProgressReporter, SeedGenerator};
use crate::{
    config::HttpBackendConfig,
    error::{Result, StudioError},
    models::{ImageArtifact, ImageFormat},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

/// Client for a diffusion sidecar exposing the OpenAI-compatible images API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    model_name: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &HttpBackendConfig) -> Result<Self> {
        let endpoint = config.endpoint()?.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StudioError::ConfigError(format!("HTTP client: {}", e)))?;

        log::info!(
            "Diffusion backend configured: endpoint={}, model={}",
            endpoint,
            config.model_name()
        );

        Ok(Self {
            client,
            endpoint,
            model_name: config.model_name().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_payload(&self, call: &BackendCall, generator: &SeedGenerator) -> Value {
        let mut body = json!({
            "prompt": call.prompt,
            "model": self.model_name,
            "size": call.size(),
            "n": call.image_count,
            "num_inference_steps": call.steps,
            "guidance_scale": call.guidance_scale,
            "response_format": "b64_json",
        });

        if let Some(seed) = generator.seeds().first() {
            body["seed"] = json!(seed);
        }
        if !generator.is_shared() {
            body["seeds"] = json!(generator.seeds());
        }

        body
    }

    fn decode_images(call: &BackendCall, response: ImagesResponse) -> Result<Vec<ImageArtifact>> {
        response
            .data
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let encoded = item.b64_json.ok_or_else(|| {
                    StudioError::ResponseError(format!("No b64_json for image {}", index))
                })?;
                let bytes = STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| StudioError::ResponseError(e.to_string()))?;
                let format = ImageFormat::detect(&bytes);
                Ok(ImageArtifact::new(bytes, call.width, call.height, format))
            })
            .collect()
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate(
        &self,
        call: &BackendCall,
        generator: &mut SeedGenerator,
        progress: &ProgressReporter,
    ) -> Result<Vec<ImageArtifact>> {
        let payload = self.build_payload(call, generator);
        let url = format!("{}/v1/images/generations", self.endpoint);
        log::debug!("Diffusion generate POST {}", url);

        // The images API is not streamed; only the endpoints are observable.
        progress.report(0, call.steps);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StudioError::RequestError(format!("Diffusion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StudioError::ResponseError(format!(
                "Diffusion sidecar returned {}: {}",
                status, text
            )));
        }

        let body: ImagesResponse = response
            .json()
            .await
            .map_err(|e| StudioError::ResponseError(e.to_string()))?;

        let images = Self::decode_images(call, body)?;
        progress.report(call.steps, call.steps);
        Ok(images)
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                log::debug!("Diffusion health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeedMode;

    fn backend() -> HttpBackend {
        HttpBackend::new(&HttpBackendConfig::new().with_endpoint("http://localhost:30000/"))
            .unwrap()
    }

    fn call() -> BackendCall {
        BackendCall {
            prompt: "a tiny astronaut hatching from an egg on the moon".into(),
            width: 1024,
            height: 768,
            steps: 4,
            guidance_scale: 0.0,
            image_count: 2,
        }
    }

    #[test]
    fn test_endpoint_trimmed() {
        assert_eq!(backend().endpoint(), "http://localhost:30000");
    }

    #[test]
    fn test_requires_endpoint() {
        assert!(HttpBackend::new(&HttpBackendConfig::new()).is_err());
    }

    #[test]
    fn test_payload_per_batch() {
        let generator = SeedGenerator::new(&[42, 42], SeedMode::PerBatch);
        let payload = backend().build_payload(&call(), &generator);

        assert_eq!(payload["size"], "1024x768");
        assert_eq!(payload["n"], 2);
        assert_eq!(payload["num_inference_steps"], 4);
        assert_eq!(payload["guidance_scale"], 0.0);
        assert_eq!(payload["seed"], 42);
        assert!(payload.get("seeds").is_none());
    }

    #[test]
    fn test_payload_per_image() {
        let generator = SeedGenerator::new(&[42, 43], SeedMode::PerImage);
        let payload = backend().build_payload(&call(), &generator);
        assert_eq!(payload["seeds"], json!([42, 43]));
    }

    #[test]
    fn test_decode_images() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let response = ImagesResponse {
            data: vec![ImageData {
                b64_json: Some(STANDARD.encode(png)),
            }],
        };

        let images = HttpBackend::decode_images(&call(), response).unwrap();
        assert_eq!(images[0].format, ImageFormat::Png);
        assert_eq!(images[0].width, 1024);

        let missing = ImagesResponse {
            data: vec![ImageData { b64_json: None }],
        };
        assert!(HttpBackend::decode_images(&call(), missing).is_err());
    }
}
