use crate::{
    config::bounds::MAX_SEED,
    models::{SeedMode, SeedSpec},
};
use rand::Rng;

/// Effective seed for one draw.
///
/// A fixed seed is passed through untouched, range checks happen when the
/// request is built.
pub fn resolve_seed(requested: i64, randomize: bool) -> i64 {
    resolve_seed_with(&mut rand::thread_rng(), requested, randomize)
}

pub fn resolve_seed_with<R: Rng + ?Sized>(rng: &mut R, requested: i64, randomize: bool) -> i64 {
    if randomize {
        rng.gen_range(0..=MAX_SEED as i64)
    } else {
        requested
    }
}

/// One seed per image of a batch of `sample_count`.
pub fn resolve_seeds(spec: SeedSpec, sample_count: u32, mode: SeedMode) -> Vec<i64> {
    resolve_seeds_with(&mut rand::thread_rng(), spec, sample_count, mode)
}

pub fn resolve_seeds_with<R: Rng + ?Sized>(
    rng: &mut R,
    spec: SeedSpec,
    sample_count: u32,
    mode: SeedMode,
) -> Vec<i64> {
    let count = sample_count as usize;

    match mode {
        SeedMode::PerBatch => {
            let seed = resolve_seed_with(rng, spec.requested_seed, spec.randomize);
            vec![seed; count]
        }
        SeedMode::PerImage if spec.randomize => (0..count)
            .map(|_| resolve_seed_with(rng, spec.requested_seed, true))
            .collect(),
        // Out-of-range seeds are left for the builder to reject.
        SeedMode::PerImage if !(0..=MAX_SEED as i64).contains(&spec.requested_seed) => {
            vec![spec.requested_seed; count]
        }
        SeedMode::PerImage => (0..count as i64)
            .map(|i| (spec.requested_seed + i) % (MAX_SEED as i64 + 1))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn spec(requested_seed: i64, randomize: bool) -> SeedSpec {
        SeedSpec {
            requested_seed,
            randomize,
        }
    }

    #[test]
    fn test_fixed_seed_passes_through() {
        for requested in [0, 1, 42, MAX_SEED as i64, -3, MAX_SEED as i64 + 10] {
            assert_eq!(resolve_seed(requested, false), requested);
        }
    }

    #[test]
    fn test_random_seed_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let seed = resolve_seed_with(&mut rng, 42, true);
            assert!((0..=MAX_SEED as i64).contains(&seed));
        }
    }

    #[test]
    fn test_random_seeds_rarely_collide() {
        let draws: std::collections::HashSet<i64> =
            (0..16).map(|_| resolve_seed(0, true)).collect();
        assert!(draws.len() > 1);
    }

    #[test]
    fn test_per_batch_repeats_one_seed() {
        assert_eq!(
            resolve_seeds(spec(42, false), 3, SeedMode::PerBatch),
            vec![42, 42, 42]
        );

        let mut rng = StdRng::seed_from_u64(1);
        let seeds = resolve_seeds_with(&mut rng, spec(42, true), 4, SeedMode::PerBatch);
        assert_eq!(seeds.len(), 4);
        assert!(seeds.iter().all(|s| *s == seeds[0]));
    }

    #[test]
    fn test_per_image_fixed_is_sequential_and_wraps() {
        assert_eq!(
            resolve_seeds(spec(42, false), 3, SeedMode::PerImage),
            vec![42, 43, 44]
        );
        assert_eq!(
            resolve_seeds(spec(MAX_SEED as i64, false), 2, SeedMode::PerImage),
            vec![MAX_SEED as i64, 0]
        );
    }

    #[test]
    fn test_per_image_out_of_range_seed_not_derived() {
        assert_eq!(
            resolve_seeds(spec(i64::MAX, false), 2, SeedMode::PerImage),
            vec![i64::MAX, i64::MAX]
        );
        assert_eq!(
            resolve_seeds(spec(-5, false), 3, SeedMode::PerImage),
            vec![-5, -5, -5]
        );
    }

    #[test]
    fn test_per_image_random_draws_each() {
        let mut rng = StdRng::seed_from_u64(3);
        let seeds = resolve_seeds_with(&mut rng, spec(0, true), 5, SeedMode::PerImage);
        assert_eq!(seeds.len(), 5);
        assert!(seeds.iter().any(|s| *s != seeds[0]));
    }
}
