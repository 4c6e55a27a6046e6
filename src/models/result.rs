use super::{ImageArtifact, ProgressUpdate};
use crate::error::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Images of one request paired with the seed behind each of them.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub request_id: Uuid,
    pub images: Vec<ImageArtifact>,
    pub seeds_used: Vec<u32>,
    pub generated_at: DateTime<Utc>,
}

impl GenerationResult {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The "Seeds Used" text shown next to the gallery.
    pub fn seeds_display(&self) -> String {
        self.seeds_used
            .iter()
            .map(|seed| seed.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImageArtifact, u32)> {
        self.images.iter().zip(self.seeds_used.iter().copied())
    }

    /// Split into the tuple the UI renders.
    pub fn into_display(self) -> (Vec<ImageArtifact>, String) {
        let seeds = self.seeds_display();
        (self.images, seeds)
    }
}

/// Item of the streaming generation interface.
#[derive(Debug)]
pub enum StudioEvent {
    Progress(ProgressUpdate),
    Finished(Result<GenerationResult>),
}
