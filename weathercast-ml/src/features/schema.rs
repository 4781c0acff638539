//! The fixed feature layout.
//!
//! Column order is part of the artifact contract: the scaler's per-column
//! statistics and the model's coefficients are positional, so every producer
//! and consumer of feature vectors goes through [`FeatureRow::to_vector`].

use ndarray::Array2;

/// Number of model input columns.
pub const N_FEATURES: usize = 7;

/// Ordered model input columns.
pub const FEATURE_COLUMNS: [&str; N_FEATURES] = [
    "humidity",
    "wind_kph",
    "hour",
    "day",
    "month",
    "day_of_year",
    "weather_condition",
];

/// Encoded condition column name.
pub const CONDITION_COLUMN: &str = "weather_condition";

/// Regression target.
pub const TARGET_COLUMN: &str = "temp_c";

/// A feature vector in [`FEATURE_COLUMNS`] order.
pub type FeatureVector = [f64; N_FEATURES];

/// Owned copy of the feature column names.
pub fn feature_columns() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Stack rows into an `n × N_FEATURES` matrix.
pub fn feature_matrix(rows: &[FeatureVector]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), N_FEATURES), |(i, j)| rows[i][j])
}

/// Feature columns followed by the target, as written to the transformed table.
pub fn table_columns() -> Vec<String> {
    let mut columns = feature_columns();
    columns.push(TARGET_COLUMN.to_string());
    columns
}

/// Whether `columns` is exactly the fixed feature layout.
pub fn matches_feature_columns<S: AsRef<str>>(columns: &[S]) -> bool {
    columns.len() == N_FEATURES
        && columns
            .iter()
            .zip(FEATURE_COLUMNS)
            .all(|(a, b)| a.as_ref() == b)
}

/// One unscaled, encoded feature row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub humidity: f64,
    pub wind_kph: f64,
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub day_of_year: u32,
    pub weather_condition: u32,
}

impl FeatureRow {
    /// Lay the row out in [`FEATURE_COLUMNS`] order.
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.humidity,
            self.wind_kph,
            f64::from(self.hour),
            f64::from(self.day),
            f64::from(self.month),
            f64::from(self.day_of_year),
            f64::from(self.weather_condition),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_follows_column_order() {
        let row = FeatureRow {
            humidity: 80.0,
            wind_kph: 10.0,
            hour: 9,
            day: 1,
            month: 1,
            day_of_year: 1,
            weather_condition: 1,
        };
        assert_eq!(row.to_vector(), [80.0, 10.0, 9.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(FEATURE_COLUMNS[N_FEATURES - 1], CONDITION_COLUMN);
    }

    #[test]
    fn test_table_columns_end_with_target() {
        let columns = table_columns();
        assert_eq!(columns.len(), N_FEATURES + 1);
        assert_eq!(columns.last().map(String::as_str), Some(TARGET_COLUMN));
        assert!(matches_feature_columns(&columns[..N_FEATURES]));
        assert!(!matches_feature_columns(&columns));
    }

    #[test]
    fn test_feature_matrix_is_row_major() {
        let rows = [[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], [0.0; N_FEATURES]];
        let matrix = feature_matrix(&rows);
        assert_eq!(matrix.dim(), (2, N_FEATURES));
        assert_eq!(matrix[[0, 6]], 7.0);
        assert_eq!(matrix.row(1).sum(), 0.0);
    }
}
