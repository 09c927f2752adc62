//! Login against the controller's web UI.
//!
//! The login form posts the credentials under the positional field names
//! `4` and `5`. The controller gives no reliable signal for rejected
//! credentials, so a completed request counts as logged in.

use crate::config::Credentials;
use crate::error::{ProbeError, ProbeResult};
use crate::transport::{DeviceForm, FormTransport};

pub const LOGIN_PATH: &str = "/001.t";
pub const USER_FIELD: &str = "4";
pub const PASSWORD_FIELD: &str = "5";

/// Build the login form.
pub fn login_form(credentials: &Credentials) -> DeviceForm {
    DeviceForm::new("", "003.t", "13")
        .with(USER_FIELD, credentials.user.as_str())
        .with(PASSWORD_FIELD, credentials.password.as_str())
}

/// Submit the login form. Only a failed request is an error.
pub async fn login<T>(transport: &T, credentials: &Credentials) -> ProbeResult<()>
where
    T: FormTransport + ?Sized,
{
    tracing::debug!(user = %credentials.user, "Logging in");

    let body = transport
        .post_form(LOGIN_PATH, &login_form(credentials))
        .await
        .map_err(|e| ProbeError::Auth(e.to_string()))?;

    tracing::debug!(bytes = body.len(), "Login submitted");
    Ok(())
}
