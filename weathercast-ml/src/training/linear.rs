//! Ordinary least squares over standardized feature vectors.

use crate::features::schema::{
    FEATURE_COLUMNS, FeatureVector, N_FEATURES, feature_columns, feature_matrix,
    matches_feature_columns,
};
use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use serde::{Deserialize, Serialize};

/// Relative pivot threshold below which a direction is treated as degenerate.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// A fitted model mapping feature vectors to a temperature.
pub trait Regressor: Send + Sync {
    fn predict_one(&self, row: &FeatureVector) -> f64;

    fn predict(&self, rows: &[FeatureVector]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }
}

/// Linear regression with an intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    columns: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Least-squares fit. Returns `None` for an empty or misaligned input.
    ///
    /// Solves the normal equations of the centered problem. Columns that are
    /// constant, or linear combinations of earlier columns, get coefficient 0.
    pub fn fit(rows: &[FeatureVector], target: &[f64]) -> Option<Self> {
        if rows.len() != target.len() {
            return None;
        }
        let x = feature_matrix(rows);
        let y = ArrayView1::from(target);
        let x_mean = x.mean_axis(Axis(0))?;
        let y_mean = y.mean()?;

        let xc = &x - &x_mean;
        let yc = y.mapv(|v| v - y_mean);

        // Augmented [XᵀX | Xᵀy] over centered data.
        let mut system = Array2::<f64>::zeros((N_FEATURES, N_FEATURES + 1));
        system
            .slice_mut(s![.., ..N_FEATURES])
            .assign(&xc.t().dot(&xc));
        system.column_mut(N_FEATURES).assign(&xc.t().dot(&yc));

        let coefficients = solve(system);
        let intercept = y_mean - coefficients.dot(&x_mean);

        Some(Self {
            columns: feature_columns(),
            coefficients: coefficients.to_vec(),
            intercept,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Check the invariants a deserialized model must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if !matches_feature_columns(&self.columns) {
            return Err(format!(
                "model columns {:?} do not match feature order {:?}",
                self.columns, FEATURE_COLUMNS
            ));
        }
        if self.coefficients.len() != N_FEATURES {
            return Err(format!(
                "model has {} coefficients, expected {N_FEATURES}",
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("model parameters are not finite".to_string());
        }
        Ok(())
    }
}

impl Regressor for LinearRegression {
    fn predict_one(&self, row: &FeatureVector) -> f64 {
        let coefficients = ArrayView1::from(self.coefficients.as_slice());
        self.intercept + coefficients.dot(&ArrayView1::from(&row[..]))
    }
}

/// Gauss-Jordan elimination with partial pivoting on an augmented
/// `N_FEATURES × (N_FEATURES + 1)` system. Free variables are set to 0.
fn solve(mut m: Array2<f64>) -> Array1<f64> {
    let scale = m.diag().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = PIVOT_TOLERANCE * scale.max(f64::MIN_POSITIVE);

    let mut pivot_of = [None; N_FEATURES];
    let mut next_row = 0;
    for col in 0..N_FEATURES {
        let Some(best) = (next_row..N_FEATURES)
            .max_by(|&a, &b| m[[a, col]].abs().total_cmp(&m[[b, col]].abs()))
        else {
            break;
        };
        let pivot = m[[best, col]];
        if pivot.abs() <= tolerance {
            continue;
        }
        if best != next_row {
            for j in 0..=N_FEATURES {
                m.swap([best, j], [next_row, j]);
            }
        }
        m.row_mut(next_row).mapv_inplace(|v| v / pivot);
        let pivot_row = m.row(next_row).to_owned();
        for r in 0..N_FEATURES {
            let factor = m[[r, col]];
            if r != next_row && factor != 0.0 {
                m.row_mut(r).scaled_add(-factor, &pivot_row);
            }
        }
        pivot_of[col] = Some(next_row);
        next_row += 1;
    }

    let mut solution = Array1::zeros(N_FEATURES);
    for (col, pivot) in pivot_of.iter().enumerate() {
        if let Some(r) = pivot {
            solution[col] = m[[*r, N_FEATURES]];
        }
    }
    solution
}
