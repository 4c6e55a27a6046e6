use crate::models::{GenerationResult, ImageArtifact};
use chrono::Utc;
use uuid::Uuid;

pub struct ResultPackager {
    request_id: Uuid,
}

impl ResultPackager {
    pub fn new(request_id: Uuid) -> Self {
        Self { request_id }
    }

    /// Pair images with their seeds, keeping backend order.
    ///
    /// # Panics
    ///
    /// If the two sequences differ in length.
    pub fn package(&self, images: Vec<ImageArtifact>, seeds_used: Vec<u32>) -> GenerationResult {
        assert_eq!(
            images.len(),
            seeds_used.len(),
            "every image needs exactly one seed"
        );

        GenerationResult {
            request_id: self.request_id,
            images,
            seeds_used,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageFormat;

    fn image(tag: u8) -> ImageArtifact {
        ImageArtifact::new(vec![tag], 1, 1, ImageFormat::Rgb8)
    }

    #[test]
    fn test_preserves_order() {
        let id = Uuid::new_v4();
        let result = ResultPackager::new(id).package(vec![image(3), image(1), image(2)], vec![7, 8, 9]);

        assert_eq!(result.request_id, id);
        let tags: Vec<u8> = result.images.iter().map(|img| img.data[0]).collect();
        assert_eq!(tags, vec![3, 1, 2]);
        assert_eq!(result.seeds_used, vec![7, 8, 9]);
    }

    #[test]
    #[should_panic(expected = "every image needs exactly one seed")]
    fn test_length_mismatch_panics() {
        ResultPackager::new(Uuid::new_v4()).package(vec![image(0)], vec![1, 2]);
    }
}
