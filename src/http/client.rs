use std::time::Duration;

use reqwest::{Client, redirect};

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

/// Transport settings shared by replay requests and input downloads.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub redirect_limit: u32,
    pub disable_keepalive: bool,
    pub insecure: bool,
    pub no_ua: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            redirect_limit: 10,
            disable_keepalive: false,
            insecure: false,
            no_ua: false,
        }
    }
}

/// Builds the reqwest client. No overall request timeout is set here; the
/// executor enforces its own deadline around each call.
///
/// # Errors
///
/// Returns an error when the underlying TLS backend cannot be initialized.
pub fn build_client(settings: &ClientSettings) -> AppResult<Client> {
    let mut client_builder = Client::builder().connect_timeout(settings.connect_timeout);

    if !settings.no_ua {
        client_builder = client_builder.user_agent(DEFAULT_USER_AGENT);
    }

    if settings.redirect_limit == 0 {
        client_builder = client_builder.redirect(redirect::Policy::none());
    } else {
        client_builder = client_builder.redirect(redirect::Policy::limited(
            usize::try_from(settings.redirect_limit).unwrap_or(10),
        ));
    }

    if settings.disable_keepalive {
        client_builder = client_builder
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Some(Duration::from_secs(0)));
    }

    if settings.insecure {
        client_builder = client_builder.danger_accept_invalid_certs(true);
    }

    client_builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
