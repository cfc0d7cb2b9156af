//! Train/test splitting and feature scaling
//!
//! The split is a seeded shuffle so runs are reproducible. The scaler is
//! fit on the training partition only and then applied to both partitions
//! and to every later inference call; it is never refit.

use crate::preprocess::EncodedDataset;
use crate::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Disjoint train/test partitions of one encoded dataset
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub y_train: Vec<u8>,
    pub x_test: Array2<f64>,
    pub y_test: Vec<u8>,
}

/// Partition an encoded dataset into train/test with a seeded shuffle.
///
/// `train.len() + test.len() == dataset.len()` and the partitions are
/// disjoint by construction (each row index lands in exactly one side).
pub fn train_test_split(data: &EncodedDataset, test_fraction: f64, seed: u64) -> Result<Split> {
    let n = data.len();
    if test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(Error::Training(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n_test = ((n as f64) * test_fraction).round() as usize;
    if n_test == 0 || n_test >= n {
        return Err(Error::Training(format!(
            "test fraction {test_fraction} leaves an empty partition for {n} rows"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok(Split {
        x_train: select_rows(&data.features, train_idx)?,
        y_train: train_idx.iter().map(|&i| data.labels[i]).collect(),
        x_test: select_rows(&data.features, test_idx)?,
        y_test: test_idx.iter().map(|&i| data.labels[i]).collect(),
    })
}

fn select_rows(features: &Array2<f64>, indices: &[usize]) -> Result<Array2<f64>> {
    let ncols = features.ncols();
    let mut data = Vec::with_capacity(indices.len() * ncols);
    for &i in indices {
        data.extend(features.row(i).iter().copied());
    }
    Array2::from_shape_vec((indices.len(), ncols), data)
        .map_err(|e| Error::Training(format!("partition matrix shape error: {e}")))
}

/// Per-feature mean/standard-deviation fit on the training partition.
///
/// Persisted alongside the model so inference scales features identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParameters {
    /// Per-column mean
    pub mean: Vec<f64>,
    /// Per-column standard deviation; constant columns are stored as 1.0
    /// so scaling them is the identity
    pub std: Vec<f64>,
}

impl ScalerParameters {
    /// Fit on a training feature matrix
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(Error::Training(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }
        let mut mean = Vec::with_capacity(x.ncols());
        let mut std = Vec::with_capacity(x.ncols());
        for col in x.columns() {
            let m = col.sum() / n as f64;
            let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n as f64;
            let s = var.sqrt();
            mean.push(m);
            std.push(if s > 0.0 { s } else { 1.0 });
        }
        Ok(Self { mean, std })
    }

    /// Scale a feature matrix to zero mean / unit variance per column
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[j]) / self.std[j];
            }
        }
        out
    }

    /// Scale one feature vector in place
    pub fn transform_row(&self, row: &mut [f64]) {
        for (j, v) in row.iter_mut().enumerate() {
            *v = (*v - self.mean[j]) / self.std[j];
        }
    }
}
