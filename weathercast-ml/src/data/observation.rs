//! Raw weather observation as stored in the append-only raw table.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Columns the feature builder cannot work without.
pub const REQUIRED_RAW_COLUMNS: [&str; 5] =
    ["date_time", "humidity", "wind_kph", "condition", "temp_c"];

/// Cell values read as missing, matching the default NA markers of common
/// dataframe readers.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a cell is an NA marker once surrounding whitespace is removed.
pub fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

/// One periodic weather observation.
///
/// Every field is optional: the raw table tolerates missing cells, and the
/// builder drops incomplete rows rather than failing. Blank cells and
/// [`NA_TOKENS`] deserialize to `None`. Field order is the
/// column order of the raw CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, deserialize_with = "na_text")]
    pub date_time: Option<String>,
    #[serde(default, deserialize_with = "na_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "na_number")]
    pub temp_c: Option<f64>,
    #[serde(default, deserialize_with = "na_number")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "na_number")]
    pub wind_kph: Option<f64>,
    #[serde(default, deserialize_with = "na_text")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "na_number")]
    pub cloud: Option<f64>,
    #[serde(default, deserialize_with = "na_number")]
    pub pressure_mb: Option<f64>,
    #[serde(default, deserialize_with = "na_number")]
    pub precip_mm: Option<f64>,
    #[serde(default, deserialize_with = "na_number")]
    pub vis_km: Option<f64>,
}

impl Observation {
    /// Observation carrying only the fields the model consumes.
    pub fn new(
        date_time: impl Into<String>,
        humidity: f64,
        wind_kph: f64,
        condition: impl Into<String>,
        temp_c: f64,
    ) -> Self {
        Self {
            date_time: Some(date_time.into()),
            humidity: Some(humidity),
            wind_kph: Some(wind_kph),
            condition: Some(condition.into()),
            temp_c: Some(temp_c),
            ..Self::default()
        }
    }

    /// Timestamp text, treating blank cells as missing.
    pub fn timestamp(&self) -> Option<&str> {
        non_blank(self.date_time.as_deref())
    }

    /// Condition label, treating blank cells as missing.
    pub fn condition_label(&self) -> Option<&str> {
        non_blank(self.condition.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_na(v)).map(str::trim)
}

fn na_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let cell = Option::<String>::deserialize(deserializer)?;
    Ok(cell.filter(|v| !is_na(v)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumericCell {
    Number(f64),
    Text(String),
}

fn na_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<NumericCell>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumericCell::Number(v)) => Ok(Some(v)),
        Some(NumericCell::Text(cell)) if is_na(&cell) => Ok(None),
        Some(NumericCell::Text(cell)) => cell
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid number {cell:?}"))),
    }
}

/// A numeric cell that is present and finite.
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cells_are_missing() {
        let mut obs = Observation::new("  ", 80.0, 10.0, "Sunny", 30.0);
        assert_eq!(obs.timestamp(), None);
        obs.condition = Some(" Light rain ".into());
        assert_eq!(obs.condition_label(), Some("Light rain"));
    }

    #[test]
    fn test_na_markers_are_missing() {
        let obs = Observation::new("NA", 80.0, 10.0, " N/A ", 30.0);
        assert_eq!(obs.timestamp(), None);
        assert_eq!(obs.condition_label(), None);
        assert!(is_na("null"));
        assert!(!is_na("Sunny"));
    }

    #[test]
    fn test_csv_na_cells_deserialize_to_none() {
        let data = "date_time,city,temp_c,humidity,wind_kph,condition\n\
                    2025-01-01 09:00,Jakarta,30,NA,10,Sunny\n\
                    2025-01-01 15:00,null,32,60,5,N/A\n\
                    2025-01-01 21:00,,29.5,70, 4 ,Mist\n";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let rows: Vec<Observation> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows[0].humidity, None);
        assert_eq!(rows[0].temp_c, Some(30.0));
        assert_eq!(rows[1].city, None);
        assert_eq!(rows[1].condition, None);
        assert_eq!(rows[2].city, None);
        assert_eq!(rows[2].wind_kph, Some(4.0));
        assert_eq!(rows[2].cloud, None);
    }

    #[test]
    fn test_csv_garbage_number_is_an_error() {
        let data = "date_time,humidity\n2025-01-01 09:00,wet\n";
        let mut reader = csv::ReaderBuilder::new().from_reader(data.as_bytes());
        let row: Result<Observation, _> = reader.deserialize().next().unwrap();
        assert!(row.is_err());
    }

    #[test]
    fn test_finite_filters_nan() {
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(1.5)), Some(1.5));
        assert_eq!(finite(None), None);
    }
}
