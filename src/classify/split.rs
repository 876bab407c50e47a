//! Seeded train/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::error::{ClassifyError, ClassifyResult};

/// Row indices on each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_size)` rows.
///
/// Both sides always get at least one row. The same `(n, test_size, seed)`
/// always yields the same split, so the SELECT and WHERE classifiers of one
/// run are evaluated on the same questions.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> ClassifyResult<Split> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ClassifyError::InvalidTestSize { value: test_size });
    }
    if n < 2 {
        return Err(ClassifyError::NotEnoughSamples { count: n });
    }

    let n_test = ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1);
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(n_test);
    Ok(Split { train, test: order })
}
