use crate::{
    config::bounds::{GUIDANCE_SCALE, MAX_SEED},
    error::{Result, StudioError},
    models::{GenerationRequest, SeedMode, ValidatedParams},
};

/// Assemble the immutable request handed to the backend.
pub fn build(
    prompt: &str,
    params: ValidatedParams,
    seeds: &[i64],
    seed_mode: SeedMode,
) -> Result<GenerationRequest> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(StudioError::EmptyPrompt);
    }

    assert_eq!(
        seeds.len(),
        params.sample_count as usize,
        "one seed per requested image"
    );

    let seeds = seeds
        .iter()
        .map(|seed| checked_seed(*seed))
        .collect::<Result<Vec<u32>>>()?;

    Ok(GenerationRequest::new(
        prompt.to_string(),
        params,
        GUIDANCE_SCALE,
        seed_mode,
        seeds,
    ))
}

fn checked_seed(seed: i64) -> Result<u32> {
    if (0..=MAX_SEED as i64).contains(&seed) {
        Ok(seed as u32)
    } else {
        Err(StudioError::invalid(
            "seed",
            format!("must be between 0 and {}, got {}", MAX_SEED, seed),
        ))
    }
}
