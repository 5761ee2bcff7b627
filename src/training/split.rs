//! Stratified, seeded train/test splitting

use crate::error::{HeartwiseError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of each partition
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Split rows into train/test partitions, preserving class proportions.
///
/// The test partition holds `ceil(n * test_size)` rows. Each class
/// contributes proportionally (floor, then the remainder goes to the classes
/// with the largest fractional share). Classes are visited in ascending
/// label order and shuffled with a `ChaCha8Rng` seeded from `seed`, so the
/// same inputs always give the same split.
pub fn stratified_split(y: &Array1<f64>, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HeartwiseError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }
    let n_samples = y.len();
    if n_samples == 0 {
        return Err(HeartwiseError::EmptyDataset(
            "no rows left to split".to_string(),
        ));
    }

    // Group samples by class
    let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, &val) in y.iter().enumerate() {
        class_indices.entry(val.round() as i64).or_default().push(idx);
    }

    let n_test = ((n_samples as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(n_samples);

    // Proportional allocation with largest-remainder rounding
    let mut allocation: Vec<(i64, usize, f64)> = class_indices
        .iter()
        .map(|(&class, idx)| {
            let exact = idx.len() as f64 * n_test as f64 / n_samples as f64;
            (class, exact.floor() as usize, exact - exact.floor())
        })
        .collect();

    let allocated: usize = allocation.iter().map(|(_, k, _)| *k).sum();
    let mut order: Vec<usize> = (0..allocation.len()).collect();
    order.sort_by(|&a, &b| {
        allocation[b]
            .2
            .partial_cmp(&allocation[a].2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(allocation[a].0.cmp(&allocation[b].0))
    });
    for &i in order.iter().cycle().take(n_test.saturating_sub(allocated)) {
        allocation[i].1 += 1;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(n_samples - n_test);
    let mut test_indices = Vec::with_capacity(n_test);

    for ((_, indices), (_, k, _)) in class_indices.iter_mut().zip(allocation.iter()) {
        indices.shuffle(&mut rng);
        let k = (*k).min(indices.len());
        test_indices.extend_from_slice(&indices[..k]);
        train_indices.extend_from_slice(&indices[k..]);
    }

    train_indices.shuffle(&mut rng);
    test_indices.shuffle(&mut rng);

    Ok(TrainTestSplit {
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pos: usize, neg: usize) -> Array1<f64> {
        let mut v = vec![1.0; pos];
        v.extend(std::iter::repeat(0.0).take(neg));
        Array1::from_vec(v)
    }

    #[test]
    fn test_sizes_and_disjointness() {
        let y = labels(40, 60);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 20);
        assert_eq!(split.train_indices.len(), 80);

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_class_ratio_preserved() {
        let y = labels(40, 60);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        let test_pos = split.test_indices.iter().filter(|&&i| y[i] == 1.0).count();
        let train_pos = split.train_indices.iter().filter(|&&i| y[i] == 1.0).count();
        assert_eq!(test_pos, 8);
        assert_eq!(train_pos, 32);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let y = labels(13, 17);
        let a = stratified_split(&y, 0.2, 42).unwrap();
        let b = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(&y, 0.2, 7).unwrap();
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn test_uneven_allocation_fills_test_size() {
        // 7 * 0.2 = 1.4 -> 2 test rows
        let y = labels(3, 4);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 2);
        assert_eq!(split.train_indices.len(), 5);
    }

    #[test]
    fn test_invalid_test_size() {
        let y = labels(2, 2);
        assert!(stratified_split(&y, 0.0, 42).is_err());
        assert!(stratified_split(&y, 1.0, 42).is_err());
    }

    #[test]
    fn test_empty_labels() {
        let y = Array1::<f64>::zeros(0);
        assert!(matches!(
            stratified_split(&y, 0.2, 42),
            Err(HeartwiseError::EmptyDataset(_))
        ));
    }
}
