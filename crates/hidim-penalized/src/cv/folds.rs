//! Fold assignment

use crate::error::{PenalizedError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Partition of `0..n` into K folds
///
/// Every observation belongs to exactly one fold and fold sizes differ by at
/// most one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldAssignment {
    fold_of: Vec<usize>,
    n_folds: usize,
}

impl FoldAssignment {
    fn check(n: usize, k: usize) -> Result<()> {
        if k < 2 || k > n {
            return Err(PenalizedError::InvalidParameter(format!(
                "number of folds must satisfy 2 <= K <= n, got K = {k} with n = {n}"
            )));
        }
        Ok(())
    }

    /// Shuffled, balanced assignment; reproducible for a given seed
    pub fn random(n: usize, k: usize, seed: u64) -> Result<Self> {
        Self::check(n, k)?;
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let mut fold_of = vec![0; n];
        for (position, &i) in order.iter().enumerate() {
            fold_of[i] = position % k;
        }
        Ok(Self { fold_of, n_folds: k })
    }

    /// Contiguous blocks in observation order
    pub fn sequential(n: usize, k: usize) -> Result<Self> {
        Self::check(n, k)?;
        let base = n / k;
        let extra = n % k;
        let mut fold_of = Vec::with_capacity(n);
        for fold in 0..k {
            let size = base + usize::from(fold < extra);
            fold_of.extend(std::iter::repeat_n(fold, size));
        }
        Ok(Self { fold_of, n_folds: k })
    }

    /// Wrap an explicit assignment; every fold must be non-empty
    pub fn from_labels(fold_of: Vec<usize>) -> Result<Self> {
        let n_folds = fold_of.iter().max().map_or(0, |&m| m + 1);
        Self::check(fold_of.len(), n_folds)?;
        if let Some(empty) = (0..n_folds).find(|f| !fold_of.contains(f)) {
            return Err(PenalizedError::InvalidParameter(format!("fold {empty} is empty")));
        }
        Ok(Self { fold_of, n_folds })
    }

    /// Number of folds
    pub const fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.fold_of.len()
    }

    /// True when no observations are assigned
    pub fn is_empty(&self) -> bool {
        self.fold_of.is_empty()
    }

    /// Fold label of each observation
    pub fn labels(&self) -> &[usize] {
        &self.fold_of
    }

    /// Held-out observations of `fold`
    pub fn test_indices(&self, fold: usize) -> Vec<usize> {
        self.fold_of
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| (f == fold).then_some(i))
            .collect()
    }

    /// Training observations for `fold`
    pub fn train_indices(&self, fold: usize) -> Vec<usize> {
        self.fold_of
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| (f != fold).then_some(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 3)]
    #[case(7, 7)]
    #[case(101, 10)]
    fn test_random_folds_partition(#[case] n: usize, #[case] k: usize) {
        let folds = FoldAssignment::random(n, k, 7).unwrap();

        let mut seen = vec![0; n];
        let mut sizes = Vec::new();
        for fold in 0..k {
            let test = folds.test_indices(fold);
            sizes.push(test.len());
            for &i in &test {
                seen[i] += 1;
            }
            assert_eq!(test.len() + folds.train_indices(fold).len(), n);
        }

        assert!(seen.iter().all(|&c| c == 1));
        let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
        assert!(max - min <= 1);
    }

    #[test]
    fn test_random_folds_reproducible() {
        let a = FoldAssignment::random(50, 5, 42).unwrap();
        let b = FoldAssignment::random(50, 5, 42).unwrap();
        let c = FoldAssignment::random(50, 5, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sequential_folds() {
        let folds = FoldAssignment::sequential(7, 3).unwrap();
        assert_eq!(folds.labels(), &[0, 0, 0, 1, 1, 2, 2]);
        assert_eq!(folds.test_indices(1), vec![3, 4]);
    }

    #[rstest]
    #[case(5, 1)]
    #[case(5, 6)]
    #[case(0, 2)]
    fn test_invalid_fold_counts(#[case] n: usize, #[case] k: usize) {
        assert!(FoldAssignment::random(n, k, 0).is_err());
        assert!(FoldAssignment::sequential(n, k).is_err());
    }

    #[test]
    fn test_explicit_labels() {
        assert!(FoldAssignment::from_labels(vec![0, 1, 0, 1]).is_ok());
        assert!(FoldAssignment::from_labels(vec![0, 2, 0, 2]).is_err());
    }
}
