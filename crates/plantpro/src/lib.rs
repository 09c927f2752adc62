//! PlantPro — decoding and threshold policy for PlantPro controller web UI data.

pub mod perfdata;
pub mod policy;
pub mod table;
pub mod types;

pub use perfdata::{format_value, perf_data, perf_token};
pub use policy::evaluate;
pub use table::{decode_alarm_page, decode_sensor_page};
pub use types::*;
