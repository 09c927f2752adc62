//! check_plantpro — monitoring plugin for PlantPro controllers.

pub mod config;
pub mod error;
pub mod runner;
pub mod scrape;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{Credentials, ProbeConfig, RetryPolicy};
pub use error::{FailureKind, ProbeError, ProbeResult, RetriesExhausted};
pub use runner::{Probe, Snapshot};
pub use transport::{DeviceForm, FormTransport, HttpTransport};
