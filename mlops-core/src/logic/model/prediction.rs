//! Prediction output

use serde::{Deserialize, Serialize};

/// Class decision for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Index into the model's class list
    pub class: usize,
    /// One probability per class, summing to 1
    pub probabilities: Vec<f64>,
    /// Probability of the chosen class
    pub confidence: f64,
}

impl Prediction {
    pub fn from_probabilities(mut probabilities: Vec<f64>) -> Self {
        let total: f64 = probabilities.iter().sum();
        if total > 0.0 && (total - 1.0).abs() > 1e-9 {
            for p in probabilities.iter_mut() {
                *p /= total;
            }
        }

        let class = argmax(&probabilities);
        let confidence = probabilities.get(class).copied().unwrap_or(0.0);
        Self {
            class,
            probabilities,
            confidence,
        }
    }
}

/// Index of the largest value; ties go to the lowest index
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_ties_pick_first() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.8]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_from_probabilities() {
        let p = Prediction::from_probabilities(vec![0.3, 0.7]);
        assert_eq!(p.class, 1);
        assert_eq!(p.confidence, 0.7);
        assert!(p.confidence >= 0.5);
    }

    #[test]
    fn test_unnormalized_input_is_rescaled() {
        let p = Prediction::from_probabilities(vec![2.0, 6.0]);
        assert!((p.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(p.probabilities, vec![0.25, 0.75]);
    }
}
