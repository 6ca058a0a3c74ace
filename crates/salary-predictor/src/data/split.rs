//! Seeded train/test splitting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Default fraction of rows held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Shuffle `0..n_rows` with a seeded RNG and split off a test set.
///
/// The test set has `ceil(n_rows * test_fraction)` rows, but never all of
/// them: at least one row stays in the training set when `n_rows > 0`.
/// Returns `(train, test)` index vectors.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test = ((n_rows as f64) * fraction).ceil() as usize;
    let n_test = n_test.min(n_rows.saturating_sub(1));

    let train = indices.split_off(n_test);
    (train, indices)
}

/// Split `0..n_rows` into `(train, valid, test)`.
///
/// The test set is exactly the one [`train_test_split`] returns for the same
/// arguments; the validation set is then carved out of the remaining training
/// rows with `valid_fraction`, so it never overlaps the test set.
pub fn train_valid_test_split(
    n_rows: usize,
    test_fraction: f64,
    valid_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let (rest, test) = train_test_split(n_rows, test_fraction, seed);
    let (train_pos, valid_pos) = train_test_split(rest.len(), valid_fraction, seed.wrapping_add(1));
    let train = train_pos.iter().map(|&i| rest[i]).collect();
    let valid = valid_pos.iter().map(|&i| rest[i]).collect();
    (train, valid, test)
}
