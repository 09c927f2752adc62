//! Form submission against the controller's web UI.
//!
//! The controller only understands the field layout of its own HTML forms,
//! so every request is a url-encoded POST with a fixed leading set of fields.

use async_trait::async_trait;

use crate::config::ProbeConfig;
use crate::error::{ProbeError, ProbeResult};

/// Ordered form fields. Setting an existing field keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceForm {
    fields: Vec<(String, String)>,
}

impl DeviceForm {
    /// Standard leading fields with the current Unix time as `timestamp`.
    pub fn new(id_menu: &str, go: &str, id_button: &str) -> Self {
        Self::with_timestamp(chrono::Utc::now().timestamp(), id_menu, go, id_button)
    }

    pub fn with_timestamp(timestamp: i64, id_menu: &str, go: &str, id_button: &str) -> Self {
        Self {
            fields: vec![
                ("timestamp".to_string(), timestamp.to_string()),
                ("msg".to_string(), String::new()),
                ("idmenu".to_string(), id_menu.to_string()),
                ("go".to_string(), go.to_string()),
                ("idbutton".to_string(), id_button.to_string()),
            ],
        }
    }

    /// Set a field, appending it if absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_string(), value)),
        }
        self
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// Something that can submit a form to a controller path and return the page.
#[async_trait]
pub trait FormTransport: Send + Sync {
    /// POST `form` to `path` (e.g. `/003.t`) and return the decoded body.
    async fn post_form(&self, path: &str, form: &DeviceForm) -> ProbeResult<String>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    encoding: String,
}

impl HttpTransport {
    /// Build a client honouring the configured timeout and encoding.
    pub fn new(config: &ProbeConfig) -> ProbeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("check_plantpro/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            encoding: config.encoding.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FormTransport for HttpTransport {
    async fn post_form(&self, path: &str, form: &DeviceForm) -> ProbeResult<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(
            url = %url,
            fields = ?redacted(form),
            "POST"
        );

        let response = self.client.post(&url).form(form.fields()).send().await?;
        let status = response.status().as_u16();
        tracing::debug!(url = %url, status, "Response");

        if status != 200 {
            return Err(ProbeError::Status { url, status });
        }

        Ok(response.text_with_charset(&self.encoding).await?)
    }
}

/// Field list for logging with the password slot masked.
fn redacted(form: &DeviceForm) -> Vec<(&str, &str)> {
    form.fields()
        .iter()
        .map(|(k, v)| {
            if k == crate::session::PASSWORD_FIELD {
                (k.as_str(), "***")
            } else {
                (k.as_str(), v.as_str())
            }
        })
        .collect()
}
