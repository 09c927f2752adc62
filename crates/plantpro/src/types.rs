//! Core data types for PlantPro sensor readings, alarms, and check results.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{Serialize, Serializer};

/// A single numeric measurement scraped from the controller's sensor table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SensorReading {
    /// Dot-joined module and metric, e.g. `I/O-Modul 1.Kuehlung`.
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl SensorReading {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// Insertion-ordered sensor readings with unique names.
///
/// The first reading seen for a name wins; later duplicates are ignored.
#[derive(Debug, Clone, Default)]
pub struct SensorMap {
    readings: Vec<SensorReading>,
    index: HashMap<String, usize>,
}

impl SensorMap {
    /// Create a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reading unless its name is already present.
    ///
    /// Returns `true` when the reading was new.
    pub fn insert(&mut self, reading: SensorReading) -> bool {
        if self.index.contains_key(&reading.name) {
            return false;
        }
        self.index.insert(reading.name.clone(), self.readings.len());
        self.readings.push(reading);
        true
    }

    /// Look up a reading by its exact name.
    pub fn get(&self, name: &str) -> Option<&SensorReading> {
        self.index.get(name).map(|&i| &self.readings[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate readings in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SensorReading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl<'a> IntoIterator for &'a SensorMap {
    type Item = &'a SensorReading;
    type IntoIter = std::slice::Iter<'a, SensorReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

impl FromIterator<SensorReading> for SensorMap {
    fn from_iter<I: IntoIterator<Item = SensorReading>>(iter: I) -> Self {
        let mut map = SensorMap::new();
        for reading in iter {
            map.insert(reading);
        }
        map
    }
}

impl Serialize for SensorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.readings)
    }
}

/// An active fault reported by the controller, already rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Alarm(pub String);

impl Alarm {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Threshold configuration applied to the scraped sensors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdPolicy {
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    /// Name substring; `None` selects every sensor.
    pub filter: Option<String>,
}

impl ThresholdPolicy {
    /// Build a policy, treating an empty filter as "no filter".
    pub fn new(warning: Option<f64>, critical: Option<f64>, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        Self {
            warning,
            critical,
            filter: if filter.is_empty() { None } else { Some(filter) },
        }
    }

    /// Whether the sensor name passes the filter.
    pub fn selects(&self, name: &str) -> bool {
        match &self.filter {
            Some(f) => name.contains(f.as_str()),
            None => true,
        }
    }

    /// Severity of a single value against the thresholds (strict greater-than).
    pub fn classify(&self, value: f64) -> ServiceState {
        if self.critical.is_some_and(|c| value > c) {
            ServiceState::Critical
        } else if self.warning.is_some_and(|w| value > w) {
            ServiceState::Warning
        } else {
            ServiceState::Ok
        }
    }
}

/// Monitoring-plugin service state.
///
/// Ordering is by severity among OK < WARNING < CRITICAL; UNKNOWN sorts last
/// but is never produced by threshold escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Process exit code for this state.
    pub fn exit_code(self) -> u8 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Outcome of a check: state, human-readable message, and perf data.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub state: ServiceState,
    pub message: String,
    pub perf_data: String,
}

impl Report {
    /// Build a report. `|` in the message is rewritten to ` - `, since the
    /// first `|` of the output line starts the perf data.
    pub fn new(state: ServiceState, message: impl Into<String>, perf_data: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into().replace('|', " - "),
            perf_data: perf_data.into(),
        }
    }

    /// An UNKNOWN report without perf data.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ServiceState::Unknown, message, String::new())
    }

    pub fn exit_code(&self) -> u8 {
        self.state.exit_code()
    }

    /// The single output line: `<message> | <perf_data>`.
    pub fn line(&self) -> String {
        format!("{} | {}", self.message, self.perf_data)
    }
}

/// Errors raised while decoding controller pages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlantProError {
    #[error("Element '#{0}' not found in response")]
    MissingElement(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Malformed record '{record}': expected at least {expected} fields, got {found}")]
    MalformedRecord {
        record: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid value '{value}' in record '{record}'")]
    InvalidValue { record: String, value: String },

    #[error("Missing unit in record '{0}'")]
    MissingUnit(String),
}

/// Convenience result type.
pub type PlantProResult<T> = Result<T, PlantProError>;
