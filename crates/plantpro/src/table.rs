//! Decoding of the controller's server-rendered data fragments.
//!
//! Every table page embeds its rows as the text of a single element with
//! `id="datat"`: records separated by `^`, fields separated by `|`. Sensor
//! records carry the module name sparsely; an empty module field repeats the
//! module of the previous record on the same page.

use scraper::{Html, Selector};

use crate::types::{Alarm, PlantProError, PlantProResult, SensorReading};

/// Id of the element holding the delimited payload.
pub const DATA_ELEMENT_ID: &str = "datat";

const RECORD_SEPARATOR: char = '^';
const FIELD_SEPARATOR: char = '|';

/// Field positions in a sensor record: `[_, module, metric, "value unit"]`.
const MODULE_FIELD: usize = 1;
const METRIC_FIELD: usize = 2;
const READING_FIELD: usize = 3;

/// Extract the raw payload text from a page.
///
/// Returns `Ok(None)` when the element exists but its first child is not a
/// text node (an empty table).
pub fn extract_payload(html: &str) -> PlantProResult<Option<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("#{DATA_ELEMENT_ID}"))
        .map_err(|e| PlantProError::Selector(e.to_string()))?;

    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| PlantProError::MissingElement(DATA_ELEMENT_ID.to_string()))?;

    let payload = element
        .first_child()
        .and_then(|node| node.value().as_text().map(|text| String::from(&**text)));

    Ok(payload)
}

/// Decode a sensor payload into readings, in page order.
///
/// Duplicate names within the payload are returned as-is; uniqueness is the
/// caller's concern.
pub fn decode_sensors(payload: &str) -> PlantProResult<Vec<SensorReading>> {
    let mut current_module = "";
    let mut readings = Vec::new();

    for record in payload.split(RECORD_SEPARATOR) {
        if record.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
        if fields.len() <= READING_FIELD {
            return Err(PlantProError::MalformedRecord {
                record: record.to_string(),
                expected: READING_FIELD + 1,
                found: fields.len(),
            });
        }

        if !fields[MODULE_FIELD].is_empty() {
            current_module = fields[MODULE_FIELD];
        }

        let (value, unit) = split_reading(record, fields[READING_FIELD])?;
        readings.push(SensorReading {
            name: format!("{current_module}.{}", fields[METRIC_FIELD]),
            value,
            unit,
        });
    }

    Ok(readings)
}

/// Split `"<value> <unit>"` on single spaces; only the first two tokens count.
fn split_reading(record: &str, field: &str) -> PlantProResult<(f64, String)> {
    let mut tokens = field.split(' ');
    let raw_value = tokens.next().unwrap_or_default();
    let value = raw_value
        .parse::<f64>()
        .map_err(|_| PlantProError::InvalidValue {
            record: record.to_string(),
            value: raw_value.to_string(),
        })?;
    let unit = tokens
        .next()
        .ok_or_else(|| PlantProError::MissingUnit(record.to_string()))?;
    Ok((value, unit.to_string()))
}

/// Decode one sensor table page.
///
/// A page whose data element has no text is an empty page.
pub fn decode_sensor_page(html: &str) -> PlantProResult<Vec<SensorReading>> {
    match extract_payload(html)? {
        Some(payload) => decode_sensors(&payload),
        None => Ok(Vec::new()),
    }
}

/// Decode an alarm payload: each record's fields joined with ` - `.
pub fn decode_alarms(payload: &str) -> Vec<Alarm> {
    payload
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .map(|record| Alarm(record.replace(FIELD_SEPARATOR, " - ")))
        .collect()
}

/// Decode the alarm page.
///
/// A data element without text means no active alarms; a page without the
/// data element at all (e.g. a login page) is an error.
pub fn decode_alarm_page(html: &str) -> PlantProResult<Vec<Alarm>> {
    Ok(extract_payload(html)?
        .map(|payload| decode_alarms(&payload))
        .unwrap_or_default())
}
