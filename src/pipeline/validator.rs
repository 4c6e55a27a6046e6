use crate::{
    config::bounds::{DIMENSION_STEP, MAX_IMAGE_SIZE, MAX_SAMPLES, MAX_STEPS, MIN_IMAGE_SIZE},
    error::{Result, StudioError},
    models::ValidatedParams,
};

/// Clamp geometry and batch parameters into bounds.
///
/// Out-of-range values are corrected, negative values are rejected.
pub fn validate(width: i64, height: i64, steps: i64, sample_count: i64) -> Result<ValidatedParams> {
    Ok(ValidatedParams {
        width: clamp_dimension("width", width)?,
        height: clamp_dimension("height", height)?,
        steps: clamp_count("steps", steps, MAX_STEPS)?,
        sample_count: clamp_count("sample_count", sample_count, MAX_SAMPLES)?,
    })
}

/// Clamp to the size bounds, then snap to the nearest step multiple (ties up).
pub fn clamp_dimension(field: &str, value: i64) -> Result<u32> {
    let value = non_negative(field, value)?;
    let clamped = value.clamp(MIN_IMAGE_SIZE as i64, MAX_IMAGE_SIZE as i64) as u32;
    let snapped = ((clamped + DIMENSION_STEP / 2) / DIMENSION_STEP) * DIMENSION_STEP;
    Ok(snapped.clamp(MIN_IMAGE_SIZE, MAX_IMAGE_SIZE))
}

fn clamp_count(field: &str, value: i64, max: u32) -> Result<u32> {
    let value = non_negative(field, value)?;
    Ok(value.clamp(1, max as i64) as u32)
}

fn non_negative(field: &str, value: i64) -> Result<i64> {
    if value < 0 {
        return Err(StudioError::invalid(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(value)
}
