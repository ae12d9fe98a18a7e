use std::time::Duration;

use serde::Deserialize;

use crate::args::parsers::{parse_duration_or_zero_value, parse_duration_value};
use crate::args::{GatewayScheme, UrlStyle};
use crate::error::{AppError, AppResult, ConfigError};

/// Options accepted from `gateway-replay.toml` / `gateway-replay.json`.
/// Every field mirrors a CLI flag and only applies when that flag was not
/// given on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub gateway_host: Option<String>,
    pub gateway_scheme: Option<GatewayScheme>,
    pub url_style: Option<UrlStyle>,
    pub concurrency: Option<usize>,
    pub queue_high: Option<usize>,
    pub queue_low: Option<usize>,
    pub min_spacing: Option<DurationValue>,
    pub spacing_penalty: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub progress_interval: Option<DurationValue>,
    pub drain_body: Option<bool>,
    pub redirect: Option<u32>,
    pub disable_keepalive: Option<bool>,
    pub insecure: Option<bool>,
    pub no_ua: Option<bool>,
    pub summary_json: Option<String>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

/// A duration given either as whole seconds or as text with a unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// Strictly positive duration.
    pub(crate) fn to_duration(&self, field: &str) -> AppResult<Duration> {
        let parsed = match self {
            DurationValue::Seconds(secs) => parse_duration_value(&secs.to_string()),
            DurationValue::Text(text) => parse_duration_value(text),
        };
        parsed.map_err(|err| invalid_duration(field, err))
    }

    /// Duration where zero means "disabled".
    pub(crate) fn to_duration_or_zero(&self, field: &str) -> AppResult<Duration> {
        let parsed = match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_or_zero_value(text),
        };
        parsed.map_err(|err| invalid_duration(field, err))
    }
}

fn invalid_duration(field: &str, err: crate::error::ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidDuration {
        field: field.to_owned(),
        source: err,
    })
}
