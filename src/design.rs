//! Space-filling initial designs on the unit hypercube.
//!
//! The controller needs an initial batch before it can fit a surrogate.
//! These helpers produce one: uniform random points, or (with the
//! **`sobol`** feature) scrambled Sobol points that cover the cube more
//! evenly for the same count.
//!
//! ```
//! use bayesopt::design::random_points;
//!
//! let points = random_points(8, 3, Some(7));
//! assert_eq!(points.len(), 8);
//! assert!(points.iter().flatten().all(|v| (0.0..1.0).contains(v)));
//! ```

use crate::types::Bounds;

/// `n` uniform random points in `[0, 1)^dim`.
///
/// The same `seed` yields the same points.
#[must_use]
pub fn random_points(n: usize, dim: usize, seed: Option<u64>) -> Vec<Vec<f64>> {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    random_in(&mut rng, n, &Bounds::unit(dim))
}

/// `n` scrambled Sobol points in `[0, 1)^dim`.
///
/// Dimensions beyond what the sequence supports fall back to uniform random
/// coordinates drawn from a generator seeded with `seed`.
#[cfg(feature = "sobol")]
#[must_use]
pub fn sobol_points(n: usize, dim: usize, seed: u32) -> Vec<Vec<f64>> {
    let mut rng = fastrand::Rng::with_seed(u64::from(seed));
    sobol_in(&mut rng, n, 0, seed, &Bounds::unit(dim))
}

#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

pub(crate) fn random_in(rng: &mut fastrand::Rng, n: usize, bounds: &Bounds) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| {
            bounds
                .lower()
                .iter()
                .zip(bounds.upper())
                .map(|(&lo, &hi)| f64_range(rng, lo, hi))
                .collect()
        })
        .collect()
}

/// Sobol points `offset..offset + n` scaled into `bounds`.
#[cfg(feature = "sobol")]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn sobol_in(
    rng: &mut fastrand::Rng,
    n: usize,
    offset: u32,
    seed: u32,
    bounds: &Bounds,
) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let index = offset.wrapping_add(i as u32);
            bounds
                .lower()
                .iter()
                .zip(bounds.upper())
                .enumerate()
                .map(|(d, (&lo, &hi))| {
                    let u = if d < sobol_burley::NUM_DIMENSIONS as usize {
                        f64::from(sobol_burley::sample(index, d as u32, seed))
                    } else {
                        rng.f64()
                    };
                    lo + u * (hi - lo)
                })
                .collect()
        })
        .collect()
}
