//! Synthetic observation generator for bootstrapping a raw table.
//!
//! Readings follow a few simple rules so the regression has signal to find:
//! daytime is warmer than night, wet conditions are more humid and cooler,
//! and temperature falls with humidity.

use crate::data::observation::Observation;
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use weathercast_core::GeneratorConfig;

/// Condition labels the generator draws from.
pub const CONDITIONS: [&str; 10] = [
    "Sunny",
    "Partly cloudy",
    "Cloudy",
    "Overcast",
    "Mist",
    "Patchy rain possible",
    "Light rain",
    "Moderate rain",
    "Heavy rain",
    "Thunderstorm",
];

/// Hours between consecutive observations.
pub const INTERVAL_HOURS: i64 = 6;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn is_wet(condition: &str) -> bool {
    let lower = condition.to_lowercase();
    lower.contains("rain") || lower.contains("thunder")
}

/// Generates evenly spaced observations for one city.
#[derive(Debug)]
pub struct ObservationGenerator {
    city: String,
    rng: StdRng,
    start: Option<NaiveDateTime>,
}

impl ObservationGenerator {
    pub fn new(city: impl Into<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            city: city.into(),
            rng,
            start: None,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.city.clone(), config.seed)
    }

    /// Fix the timestamp of the first observation.
    ///
    /// By default the series starts far enough in the past to end near now.
    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Produce `count` observations.
    pub fn generate(&mut self, count: usize) -> Vec<Observation> {
        let start = self.start.unwrap_or_else(|| {
            let now = Local::now().naive_local();
            now - Duration::days((count / 4) as i64)
        });
        (0..count)
            .map(|i| {
                let at = start + Duration::hours(INTERVAL_HOURS * i as i64);
                self.observe(at)
            })
            .collect()
    }

    fn observe(&mut self, at: NaiveDateTime) -> Observation {
        let hour = at.hour();
        let mut base = 28.0;
        if (10..=16).contains(&hour) {
            base += 4.0;
        }
        if hour <= 5 {
            base -= 2.0;
        }

        let mut humidity: f64 = self.rng.gen_range(55.0..95.0);
        let wind_kph: f64 = self.rng.gen_range(2.0..25.0);
        let condition = CONDITIONS.choose(&mut self.rng).copied().unwrap_or(CONDITIONS[0]);
        if is_wet(condition) {
            humidity += 10.0;
            base -= 2.0;
        }

        let noise: f64 = self.rng.sample(StandardNormal);
        let temp = base - (humidity - 70.0) * 0.05 + wind_kph * 0.02 + noise;
        let rainy = condition.to_lowercase().contains("rain");
        let precip = if rainy {
            self.rng.gen_range(0.0..10.0)
        } else {
            0.0
        };

        Observation {
            date_time: Some(at.format(TIMESTAMP_FORMAT).to_string()),
            city: Some(self.city.clone()),
            temp_c: Some(round1(temp)),
            humidity: Some(round1(humidity.min(100.0))),
            wind_kph: Some(round1(wind_kph)),
            condition: Some(condition.to_string()),
            cloud: Some(f64::from(self.rng.gen_range(0u32..100))),
            pressure_mb: Some(round1(self.rng.gen_range(1005.0..1015.0))),
            precip_mm: Some(round1(precip)),
            vis_km: Some(round1(self.rng.gen_range(2.0..10.0))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::calendar::CalendarFeatures;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_observations_are_six_hours_apart() {
        let mut generator = ObservationGenerator::new("Jakarta", Some(7)).with_start(start());
        let rows = generator.generate(5);
        let hours: Vec<u32> = rows
            .iter()
            .map(|o| CalendarFeatures::parse(o.timestamp().unwrap()).unwrap().hour)
            .collect();
        assert_eq!(hours, vec![0, 6, 12, 18, 0]);
        assert_eq!(rows[4].date_time.as_deref(), Some("2025-01-02 00:00"));
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = ObservationGenerator::new("Jakarta", Some(42))
            .with_start(start())
            .generate(20);
        let b = ObservationGenerator::new("Jakarta", Some(42))
            .with_start(start())
            .generate(20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_readings_stay_in_range() {
        let rows = ObservationGenerator::new("Jakarta", Some(1))
            .with_start(start())
            .generate(200);
        for obs in &rows {
            let humidity = obs.humidity.unwrap();
            assert!((55.0..=100.0).contains(&humidity));
            assert!((2.0..=25.0).contains(&obs.wind_kph.unwrap()));
            let condition = obs.condition_label().unwrap();
            assert!(CONDITIONS.contains(&condition));
            if !condition.to_lowercase().contains("rain") {
                assert_eq!(obs.precip_mm, Some(0.0));
            }
            assert_eq!(obs.city.as_deref(), Some("Jakarta"));
        }
    }

    #[test]
    fn test_wet_conditions() {
        assert!(is_wet("Thunderstorm"));
        assert!(is_wet("Patchy rain possible"));
        assert!(!is_wet("Mist"));
    }
}
