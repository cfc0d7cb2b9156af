//! Class-imbalance correction via synthetic minority oversampling (SMOTE)
//!
//! Synthesizes minority-class samples by interpolating between a minority
//! sample and one of its k nearest minority neighbors until both classes
//! have equal counts. Applied strictly after the train/test split and only
//! to the training partition; resampling before the split would correlate
//! synthetic points with test rows and invalidate evaluation.

use crate::{Error, Result};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// SMOTE oversampler with a seeded RNG for reproducibility
#[derive(Debug, Clone)]
pub struct Smote {
    /// Number of nearest minority neighbors considered per sample
    pub k_neighbors: usize,
    /// RNG seed
    pub seed: u64,
}

impl Smote {
    /// Create an oversampler with the given neighbor count and seed
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    /// Balance a training set so positive and negative counts are equal.
    ///
    /// Returns the original rows followed by the synthetic minority rows.
    /// Fails with a training error if only one class is present.
    pub fn balance(&self, x: &Array2<f64>, y: &[u8]) -> Result<(Array2<f64>, Vec<u8>)> {
        if x.nrows() != y.len() {
            return Err(Error::Training(format!(
                "feature rows ({}) and labels ({}) disagree",
                x.nrows(),
                y.len()
            )));
        }
        let pos = y.iter().filter(|&&v| v == 1).count();
        let neg = y.len() - pos;
        if pos == 0 || neg == 0 {
            return Err(Error::Training(
                "cannot oversample: training data contains a single class".to_string(),
            ));
        }
        if pos == neg {
            return Ok((x.clone(), y.to_vec()));
        }

        let minority_label: u8 = u8::from(pos < neg);
        let minority: Vec<usize> = y
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == minority_label)
            .map(|(i, _)| i)
            .collect();
        let n_synthetic = pos.abs_diff(neg);

        let neighbors = minority_neighbor_table(x, &minority, self.k_neighbors);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let ncols = x.ncols();
        let mut data: Vec<f64> = x.iter().copied().collect();
        let mut labels = y.to_vec();
        for _ in 0..n_synthetic {
            let pick = minority[rng.random_range(0..minority.len())];
            let base = x.row(pick);
            let row = match neighbors.get(&pick).filter(|nn| !nn.is_empty()) {
                Some(nn) => {
                    let neighbor = x.row(nn[rng.random_range(0..nn.len())]);
                    interpolate(base, neighbor, rng.random::<f64>())
                }
                // Single minority sample: nothing to interpolate against
                None => base.to_vec(),
            };
            data.extend(row);
            labels.push(minority_label);
        }

        let balanced = Array2::from_shape_vec((labels.len(), ncols), data)
            .map_err(|e| Error::Training(format!("resampled matrix shape error: {e}")))?;
        Ok((balanced, labels))
    }
}

fn interpolate(a: ArrayView1<f64>, b: ArrayView1<f64>, gap: f64) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(&u, &v)| u + gap * (v - u)).collect()
}

/// For each minority row index, its k nearest minority neighbors by
/// Euclidean distance (excluding itself).
fn minority_neighbor_table(
    x: &Array2<f64>,
    minority: &[usize],
    k: usize,
) -> std::collections::HashMap<usize, Vec<usize>> {
    let mut table = std::collections::HashMap::with_capacity(minority.len());
    for &i in minority {
        let mut dists: Vec<(f64, usize)> = minority
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| (squared_distance(x.row(i), x.row(j)), j))
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0));
        dists.truncate(k.max(1));
        if !dists.is_empty() {
            table.insert(i, dists.into_iter().map(|(_, j)| j).collect());
        }
    }
    table
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(&u, &v)| (u - v).powi(2)).sum()
}
