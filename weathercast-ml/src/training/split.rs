//! Seeded train/test split.

use crate::error::PipelineError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `floor(n * test_ratio)` rows.
///
/// Fails with `InsufficientData` when either partition would be empty.
pub fn split_indices(n: usize, test_ratio: f64, seed: u64) -> Result<Split, PipelineError> {
    let n_test = ((n as f64) * test_ratio).floor() as usize;
    let n_test = n_test.min(n);
    let n_train = n - n_test;
    if n_train == 0 || n_test == 0 {
        return Err(PipelineError::InsufficientData {
            rows: n,
            train: n_train,
            test: n_test,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_sizes() {
        let split = split_indices(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        assert_eq!(split_indices(50, 0.2, 7).unwrap(), split_indices(50, 0.2, 7).unwrap());
    }

    #[test]
    fn test_two_rows_is_insufficient() {
        match split_indices(2, 0.2, 42) {
            Err(PipelineError::InsufficientData { rows, train, test }) => {
                assert_eq!((rows, train, test), (2, 2, 0));
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_five_rows_holds_out_one() {
        let split = split_indices(5, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 1);
    }
}
