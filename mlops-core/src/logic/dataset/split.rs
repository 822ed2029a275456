//! Train/test split
//!
//! The test set gets `ceil(n * test_size)` samples. With stratification each class contributes
//! in proportion to its size, rounding handed to the classes with the largest
//! remainders.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Dataset, DatasetError, DatasetResult};

/// Both halves of a split
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}

/// Split a dataset into train and test parts
pub fn train_test_split(
    dataset: &Dataset,
    test_size: f64,
    random_state: u64,
    stratify: bool,
) -> DatasetResult<TrainTestSplit> {
    let n = dataset.n_samples();
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DatasetError::Invalid(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DatasetError::Invalid(format!(
            "cannot split {} samples with test_size {}",
            n, test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(random_state);

    let (mut train_idx, mut test_idx) = if stratify {
        stratified_indices(dataset, n_test, &mut rng)?
    } else {
        let mut all: Vec<usize> = (0..n).collect();
        all.shuffle(&mut rng);
        let train = all.split_off(n_test);
        (train, all)
    };

    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    log::info!(
        "Split {} samples into {} train / {} test (stratify: {})",
        n,
        train_idx.len(),
        test_idx.len(),
        stratify
    );

    Ok(TrainTestSplit {
        train: dataset.subset(&train_idx),
        test: dataset.subset(&test_idx),
    })
}

fn stratified_indices(
    dataset: &Dataset,
    n_test: usize,
    rng: &mut StdRng,
) -> DatasetResult<(Vec<usize>, Vec<usize>)> {
    let n = dataset.n_samples();
    let counts = dataset.class_counts();

    if counts.iter().any(|&c| c == 1) {
        return Err(DatasetError::Invalid(
            "stratified split needs at least 2 samples per class".into(),
        ));
    }

    // Proportional allocation, remainders go to the largest fractional parts
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * n_test as f64 / n as f64)
        .collect();
    let mut per_class: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut leftover = n_test - per_class.iter().sum::<usize>();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &class in order.iter().cycle() {
        if leftover == 0 {
            break;
        }
        if per_class[class] < counts[class] {
            per_class[class] += 1;
            leftover -= 1;
        }
    }

    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);

    for (class, &take) in per_class.iter().enumerate() {
        let mut members: Vec<usize> = (0..n).filter(|&i| dataset.targets[i] == class).collect();
        members.shuffle(rng);
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }

    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::load_breast_cancer;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes_round_test_set_up() {
        let data = load_breast_cancer(1).unwrap();
        let split = train_test_split(&data, 0.2, 42, true).unwrap();

        assert_eq!(split.train.n_samples(), 455);
        assert_eq!(split.test.n_samples(), 114);
        assert_eq!(split.test.class_counts(), vec![42, 72]);
        assert_eq!(split.train.class_counts(), vec![170, 285]);
    }

    #[test]
    fn test_unstratified_sizes() {
        let data = load_breast_cancer(1).unwrap();
        let split = train_test_split(&data, 0.2, 42, false).unwrap();
        assert_eq!(split.train.n_samples(), 455);
        assert_eq!(split.test.n_samples(), 114);
    }

    #[test]
    fn test_split_is_deterministic() {
        let data = load_breast_cancer(1).unwrap();
        let a = train_test_split(&data, 0.3, 9, true).unwrap();
        let b = train_test_split(&data, 0.3, 9, true).unwrap();
        assert_eq!(a.test.features, b.test.features);
        assert_eq!(a.train.targets, b.train.targets);
    }

    #[test]
    fn test_split_partitions_rows() {
        let data = load_breast_cancer(1).unwrap();
        let split = train_test_split(&data, 0.2, 3, true).unwrap();

        let key = |row: ndarray::ArrayView1<f64>| format!("{:?}", row.to_vec());
        let train: HashSet<_> = split.train.features.rows().into_iter().map(key).collect();
        let test: HashSet<_> = split.test.features.rows().into_iter().map(key).collect();

        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), data.n_samples());
    }

    #[test]
    fn test_invalid_test_size() {
        let data = load_breast_cancer(1).unwrap();
        assert!(train_test_split(&data, 0.0, 1, true).is_err());
        assert!(train_test_split(&data, 1.0, 1, true).is_err());
    }
}
