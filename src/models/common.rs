use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How seeds are assigned across the images of one batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    /// One seed drives the whole batch and is reported once per image.
    #[default]
    PerBatch,
    /// Every image gets its own seed.
    PerImage,
}

impl SeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedMode::PerBatch => "per_batch",
            SeedMode::PerImage => "per_image",
        }
    }
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeedMode {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_batch" | "batch" => Ok(SeedMode::PerBatch),
            "per_image" | "image" => Ok(SeedMode::PerImage),
            other => Err(StudioError::ConfigError(format!(
                "Unknown seed mode: {}",
                other
            ))),
        }
    }
}

/// Incremental progress of an in-flight generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProgressUpdate {
    pub step: u32,
    pub total_steps: u32,
    pub fraction: f32,
}

impl ProgressUpdate {
    pub fn new(step: u32, total_steps: u32) -> Self {
        let fraction = if total_steps == 0 {
            1.0
        } else {
            (step.min(total_steps) as f32) / (total_steps as f32)
        };

        Self {
            step: step.min(total_steps),
            total_steps,
            fraction,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.step >= self.total_steps
    }
}
