//! Uniform sampling without replacement.

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SamplerError {
    #[error("cannot draw {requested} items from a pool of {available}")]
    CountOutOfRange { requested: usize, available: usize },
}

/// Draw `count` distinct positions of `pool` uniformly at random.
///
/// Partial Fisher–Yates over an index vector: after `i` steps the first `i`
/// slots hold a uniformly random `i`-subset, so every `count`-subset is
/// equally likely. Output order is random as well. `count == pool.len()`
/// returns every element exactly once.
///
/// # Errors
///
/// Returns `SamplerError::CountOutOfRange` unless `0 < count <= pool.len()`.
pub fn sample_without_replacement<T, R>(
    pool: &[T],
    count: usize,
    rng: &mut R,
) -> Result<Vec<T>, SamplerError>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if count == 0 || count > pool.len() {
        return Err(SamplerError::CountOutOfRange {
            requested: count,
            available: pool.len(),
        });
    }

    let mut indices: Vec<usize> = (0..pool.len()).collect();
    for slot in 0..count {
        let pick = rng.random_range(slot..indices.len());
        indices.swap(slot, pick);
    }

    Ok(indices[..count].iter().map(|&i| pool[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn draws_distinct_members_of_the_pool() {
        let pool: Vec<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(7);

        for k in 1..=pool.len() {
            let drawn = sample_without_replacement(&pool, k, &mut rng).unwrap();
            assert_eq!(drawn.len(), k);
            let unique: HashSet<_> = drawn.iter().copied().collect();
            assert_eq!(unique.len(), k);
            assert!(drawn.iter().all(|x| pool.contains(x)));
        }
    }

    #[test]
    fn take_all_returns_each_element_once() {
        let pool = vec!["a", "b", "c", "d", "e"];
        let mut rng = StdRng::seed_from_u64(1);
        let mut drawn = sample_without_replacement(&pool, pool.len(), &mut rng).unwrap();
        drawn.sort_unstable();
        assert_eq!(drawn, pool);
    }

    #[test]
    fn rejects_zero_and_oversized_counts() {
        let pool = vec![1, 2, 3];
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            sample_without_replacement(&pool, 0, &mut rng).unwrap_err(),
            SamplerError::CountOutOfRange {
                requested: 0,
                available: 3
            }
        );
        assert!(sample_without_replacement(&pool, 4, &mut rng).is_err());
        assert!(sample_without_replacement::<u8, _>(&[], 1, &mut rng).is_err());
    }

    #[test]
    fn every_element_is_reachable() {
        let pool: Vec<u8> = (0..6).collect();
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = [0_u32; 6];
        for _ in 0..3_000 {
            for x in sample_without_replacement(&pool, 2, &mut rng).unwrap() {
                counts[usize::from(x)] += 1;
            }
        }
        // Expected 1000 each; a loose bound keeps this stable.
        assert!(counts.iter().all(|&c| (800..1200).contains(&c)), "{counts:?}");
    }
}
