//! Performance-data tokens in the monitoring-plugin format.

use crate::types::SensorReading;

/// Render a float the way the controller's readings were always printed:
/// integral values keep one decimal (`3.0`), others use the shortest
/// round-trip form (`21.5`). Magnitudes below `1e-4` or from `1e16` up use a
/// signed two-digit exponent (`1e-05`, `1.5e+16`); `nan`, `inf`, `-inf`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{value:?}");
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if value == 0.0 || (-4..16).contains(&exponent) {
        format!("{value:?}")
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

fn format_threshold(threshold: Option<f64>) -> String {
    threshold.map(format_value).unwrap_or_default()
}

/// One token: `'<name>'=<value><unit>;<warn>;<crit>;;`.
pub fn perf_token(reading: &SensorReading, warning: Option<f64>, critical: Option<f64>) -> String {
    format!(
        "'{}'={}{};{};{};;",
        reading.name,
        format_value(reading.value),
        reading.unit,
        format_threshold(warning),
        format_threshold(critical),
    )
}

/// Space-joined tokens for all readings.
pub fn perf_data<'a, I>(readings: I, warning: Option<f64>, critical: Option<f64>) -> String
where
    I: IntoIterator<Item = &'a SensorReading>,
{
    readings
        .into_iter()
        .map(|r| perf_token(r, warning, critical))
        .collect::<Vec<_>>()
        .join(" ")
}
