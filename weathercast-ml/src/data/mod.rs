//! Raw observation data: the append-only store, the transformed feature
//! table, and a synthetic generator.

pub mod generator;
pub mod observation;
pub mod raw_store;
pub mod table;

pub use generator::ObservationGenerator;
pub use observation::{Observation, REQUIRED_RAW_COLUMNS};
pub use raw_store::{RawStore, RawTable};
pub use table::FeatureTable;
