//! Standard Scaler
//!
//! Centers each feature on its training mean and divides by its population
//! standard deviation. Constant features get a scale of 1 so they pass
//! through centered but unscaled.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{ModelError, ModelResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Learn per-column mean and scale
    pub fn fit(x: ArrayView2<f64>) -> ModelResult<Self> {
        if x.nrows() == 0 {
            return Err(ModelError::InvalidInput("cannot fit scaler on zero rows".into()));
        }

        let n = x.nrows() as f64;
        let mut mean = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());

        for column in x.axis_iter(Axis(1)) {
            let m = column.sum() / n;
            let var = column.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();

            mean.push(m);
            scale.push(if std > f64::EPSILON { std } else { 1.0 });
        }

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> ModelResult<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }

        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            for ((v, m), s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
                *v = (*v - m) / s;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_standardizes() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        assert_eq!(scaler.mean, vec![2.0, 20.0]);

        let z = scaler.transform(x.view()).unwrap();
        for column in z.axis_iter(Axis(1)) {
            let mean = column.sum() / 3.0;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_column_keeps_unit_scale() {
        let x = array![[5.0, 1.0], [5.0, 2.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        assert_eq!(scaler.scale[0], 1.0);

        let z = scaler.transform(x.view()).unwrap();
        assert_eq!(z[[0, 0]], 0.0);
        assert!(z.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_transform_checks_width() {
        let scaler = StandardScaler::fit(array![[1.0, 2.0]].view()).unwrap();
        let err = scaler.transform(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 2, actual: 3 }));
    }
}
