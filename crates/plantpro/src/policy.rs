//! Threshold evaluation: sensors and alarms in, one service state out.

use crate::perfdata::{format_value, perf_data};
use crate::types::{Alarm, Report, SensorMap, SensorReading, ServiceState, ThresholdPolicy};

/// Separator between message lines. The report must stay on one physical
/// line, so the escape sequence is written literally.
pub const LINE_SEPARATOR: &str = "\\n";

pub const ALL_OK_MESSAGE: &str = "All sensors are OK";

/// Evaluate sensors and alarms against the policy.
pub fn evaluate(sensors: &SensorMap, alarms: &[Alarm], policy: &ThresholdPolicy) -> Report {
    let mut state = ServiceState::Ok;
    let mut lines: Vec<String> = Vec::new();

    if !alarms.is_empty() {
        state = ServiceState::Critical;
        lines.push(format!("Got '{}' alarms", alarms.len()));
        lines.extend(alarms.iter().map(|a| a.to_string()));
    }

    let selected: Vec<&SensorReading> = sensors.iter().filter(|r| policy.selects(&r.name)).collect();

    for reading in &selected {
        let level = policy.classify(reading.value);
        let label = match level {
            ServiceState::Warning => "Warning",
            ServiceState::Critical => "Critical",
            _ => continue,
        };
        state = state.max(level);
        lines.push(format!(
            "{label}: {} is {} {}",
            reading.name,
            format_value(reading.value),
            reading.unit
        ));
    }

    let message = if state == ServiceState::Ok {
        match ok_message(sensors, &selected, policy) {
            Ok(message) => message,
            Err(message) => {
                state = ServiceState::Unknown;
                message
            }
        }
    } else {
        lines.join(LINE_SEPARATOR)
    };

    let perf = perf_data(selected.iter().copied(), policy.warning, policy.critical);
    tracing::debug!(
        state = %state,
        selected = selected.len(),
        alarms = alarms.len(),
        "Evaluated sensors"
    );

    Report::new(state, message, perf)
}

/// Message for a check with nothing breaching; `Err` when the filter found nothing.
fn ok_message(
    sensors: &SensorMap,
    selected: &[&SensorReading],
    policy: &ThresholdPolicy,
) -> Result<String, String> {
    let Some(filter) = &policy.filter else {
        return Ok(ALL_OK_MESSAGE.to_string());
    };

    if selected.is_empty() {
        return Err(format!("Sensor '{filter}' not found"));
    }

    let single = sensors
        .get(filter)
        .or(if selected.len() == 1 { Some(selected[0]) } else { None });

    Ok(match single {
        Some(r) => format!("{} {}", format_value(r.value), r.unit),
        None => ALL_OK_MESSAGE.to_string(),
    })
}
