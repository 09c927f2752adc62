//! Paginated sensor scraping and alarm fetching.
//!
//! The sensor table has no page count. The first request opens the table;
//! every further request presses the "next page" button. Paging stops as
//! soon as a page contributes no sensor name that was not already seen,
//! since the controller keeps answering with its last page instead of an
//! empty one.

use plantpro::{decode_alarm_page, decode_sensor_page, Alarm, SensorMap};

use crate::error::{ProbeError, ProbeResult};
use crate::transport::{DeviceForm, FormTransport};

pub const SENSORS_PATH: &str = "/003.t";
pub const ALARMS_PATH: &str = "/036.t";

const OPEN_BUTTON: &str = "13";
const NEXT_PAGE_BUTTON: &str = "4";

/// Form that opens the sensor table on its first page.
pub fn sensor_form() -> DeviceForm {
    DeviceForm::new("", "003.t", OPEN_BUTTON).with("idline", "0")
}

/// Form that opens the active alarm list.
pub fn alarm_form() -> DeviceForm {
    DeviceForm::new("3", "037.t", "9").with("idline", "0")
}

/// Drain the sensor table page by page.
///
/// With `max_pages` set to N, at most N pages may contribute new names.
/// One more request confirms the end of the table; if that page still adds
/// names the run fails with [`ProbeError::PageLimit`].
pub async fn fetch_sensors<T>(transport: &T, max_pages: Option<u32>) -> ProbeResult<SensorMap>
where
    T: FormTransport + ?Sized,
{
    let mut sensors = SensorMap::new();
    let mut form = sensor_form();
    let mut page = 0u32;

    loop {
        page += 1;

        let html = transport.post_form(SENSORS_PATH, &form).await?;
        form.set("idbutton", NEXT_PAGE_BUTTON);

        let mut added = 0usize;
        for reading in decode_sensor_page(&html)? {
            if sensors.insert(reading) {
                added += 1;
            }
        }

        tracing::debug!(page, added, total = sensors.len(), "Sensor page");

        if added == 0 {
            break;
        }

        if let Some(limit) = max_pages {
            if page > limit {
                return Err(ProbeError::PageLimit(limit));
            }
        }
    }

    Ok(sensors)
}

/// Fetch the active alarms. An empty list means no active alarms; a page
/// without the alarm table fails with a parse error.
pub async fn fetch_alarms<T>(transport: &T) -> ProbeResult<Vec<Alarm>>
where
    T: FormTransport + ?Sized,
{
    let html = transport.post_form(ALARMS_PATH, &alarm_form()).await?;
    let alarms = decode_alarm_page(&html)?;
    tracing::debug!(count = alarms.len(), "Alarms");
    Ok(alarms)
}
