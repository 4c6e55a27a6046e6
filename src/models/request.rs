use super::SeedMode;
use crate::{
    config::InputDefaults,
    error::{Result, StudioError},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Raw parameters exactly as the UI submits them.
///
/// Numeric fields are signed so that negative input can be told apart from
/// input that merely needs clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceInput {
    pub prompt: String,
    pub seed: i64,
    pub randomize_seed: bool,
    pub width: i64,
    pub height: i64,
    pub steps: i64,
    pub sample_count: i64,
}

impl InferenceInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::with_defaults(prompt, &InputDefaults::default())
    }

    pub fn with_defaults(prompt: impl Into<String>, defaults: &InputDefaults) -> Self {
        Self {
            prompt: prompt.into(),
            seed: defaults.seed,
            randomize_seed: defaults.randomize_seed,
            width: defaults.width,
            height: defaults.height,
            steps: defaults.steps,
            sample_count: defaults.sample_count,
        }
    }

    pub fn with_seed(mut self, seed: i64, randomize: bool) -> Self {
        self.seed = seed;
        self.randomize_seed = randomize;
        self
    }

    pub fn with_size(mut self, width: i64, height: i64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_steps(mut self, steps: i64) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_sample_count(mut self, sample_count: i64) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn seed_spec(&self) -> SeedSpec {
        SeedSpec {
            requested_seed: self.seed,
            randomize: self.randomize_seed,
        }
    }

    /// Parse a loosely typed JSON object as sent by a form front end.
    ///
    /// Numbers may arrive as integers, floats (slider values) or numeric
    /// strings. Missing fields fall back to `defaults`.
    pub fn from_json(value: &Value, defaults: &InputDefaults) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| StudioError::invalid("input", "expected a JSON object"))?;

        let prompt = match object.get("prompt") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(StudioError::invalid("prompt", "expected text")),
        };

        let integer = |field: &str, default: i64| -> Result<i64> {
            match object.get(field) {
                None | Some(Value::Null) => Ok(default),
                Some(v) => parse_integer(field, v),
            }
        };

        let randomize_seed = match object.get("randomize_seed") {
            None | Some(Value::Null) => defaults.randomize_seed,
            Some(v) => parse_flag("randomize_seed", v)?,
        };

        Ok(Self {
            prompt,
            seed: integer("seed", defaults.seed)?,
            randomize_seed,
            width: integer("width", defaults.width)?,
            height: integer("height", defaults.height)?,
            steps: integer("steps", defaults.steps)?,
            sample_count: integer("sample_count", defaults.sample_count)?,
        })
    }
}

fn parse_integer(field: &str, value: &Value) -> Result<i64> {
    let number = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            n.as_f64()
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => return Ok(i),
                Err(_) => s.parse::<f64>().ok(),
            }
        }
        _ => None,
    };

    match number {
        Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.round() as i64),
        _ => Err(StudioError::invalid(field, "expected a number")),
    }
}

fn parse_flag(field: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(StudioError::invalid(field, "expected a boolean")),
        },
        _ => Err(StudioError::invalid(field, "expected a boolean")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSpec {
    pub requested_seed: i64,
    pub randomize: bool,
}

/// Geometry and batch parameters after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedParams {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub sample_count: u32,
}

/// A fully normalized request, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    request_id: Uuid,
    prompt: String,
    width: u32,
    height: u32,
    steps: u32,
    sample_count: u32,
    guidance_scale: f32,
    seed_mode: SeedMode,
    seeds: Vec<u32>,
}

impl GenerationRequest {
    pub(crate) fn new(
        prompt: String,
        params: ValidatedParams,
        guidance_scale: f32,
        seed_mode: SeedMode,
        seeds: Vec<u32>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            prompt,
            width: params.width,
            height: params.height,
            steps: params.steps,
            sample_count: params.sample_count,
            guidance_scale,
            seed_mode,
            seeds,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn guidance_scale(&self) -> f32 {
        self.guidance_scale
    }

    pub fn seed_mode(&self) -> SeedMode {
        self.seed_mode
    }

    /// The seed of the first image; the batch seed in per-batch mode.
    pub fn seed(&self) -> u32 {
        self.seeds[0]
    }

    /// One seed per image, in output order.
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }
}
