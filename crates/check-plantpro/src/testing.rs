//! In-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ProbeError, ProbeResult};
use crate::transport::{DeviceForm, FormTransport};

/// Replays queued responses per path and records every submitted form.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<ProbeResult<String>>>>,
    sent: Mutex<Vec<(String, DeviceForm)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page body for `path`. The last queued body repeats forever.
    pub fn page(self, path: &str, body: impl Into<String>) -> Self {
        self.push(path, Ok(body.into()))
    }

    pub fn status(self, path: &str, status: u16) -> Self {
        let url = format!("http://scripted{path}");
        self.push(path, Err(ProbeError::Status { url, status }))
    }

    fn push(self, path: &str, response: ProbeResult<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn sent(&self) -> Vec<(String, DeviceForm)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, path: &str) -> Vec<DeviceForm> {
        self.sent()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, f)| f)
            .collect()
    }
}

fn replay(response: &ProbeResult<String>) -> ProbeResult<String> {
    match response {
        Ok(body) => Ok(body.clone()),
        Err(ProbeError::Status { url, status }) => Err(ProbeError::Status {
            url: url.clone(),
            status: *status,
        }),
        Err(other) => Err(ProbeError::Config(other.to_string())),
    }
}

#[async_trait]
impl FormTransport for ScriptedTransport {
    async fn post_form(&self, path: &str, form: &DeviceForm) -> ProbeResult<String> {
        self.sent
            .lock()
            .unwrap()
            .push((path.to_string(), form.clone()));

        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(path)
            .unwrap_or_else(|| panic!("no scripted response for {path}"));
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            replay(queue.front().unwrap())
        }
    }
}

/// Wrap a payload the way the controller renders its table pages.
pub fn table_page(payload: &str) -> String {
    format!(
        "<html><head><title>PlantPro</title></head><body>\
         <form name=\"f\" method=\"post\"><div id=\"datat\">{payload}</div></form>\
         </body></html>"
    )
}
