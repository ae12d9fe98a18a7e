use url::Url;

use crate::args::{GatewayScheme, UrlStyle};
use crate::cid::normalize_cid;
use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Where and how request URLs are built for a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTarget {
    scheme: GatewayScheme,
    host: String,
    style: UrlStyle,
}

impl GatewayTarget {
    /// Validates `host` as a bare authority (`name` or `name:port`).
    ///
    /// # Errors
    ///
    /// Returns an error when the host is empty, carries a scheme, path or
    /// query, or does not form a valid URL authority.
    pub fn new(scheme: GatewayScheme, host: &str, style: UrlStyle) -> AppResult<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(AppError::validation(ValidationError::MissingGatewayHost));
        }
        if host.contains("://") || host.contains(['/', '?', '#', '@']) {
            return Err(AppError::validation(ValidationError::InvalidGatewayHost {
                host: host.to_owned(),
            }));
        }
        let base = format!("{}://{}/", scheme.as_str(), host);
        let parsed = Url::parse(&base).map_err(|err| {
            AppError::http(HttpError::InvalidUrl {
                url: base.clone(),
                source: err,
            })
        })?;
        if parsed.host_str().is_none() {
            return Err(AppError::validation(ValidationError::InvalidGatewayHost {
                host: host.to_owned(),
            }));
        }
        Ok(Self {
            scheme,
            host: host.to_ascii_lowercase(),
            style,
        })
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// URL for `cid` and an optional sub-path. The cid is normalized first;
    /// a path without a leading slash gets one.
    #[must_use]
    pub fn url_for(&self, cid: &str, path: &str) -> String {
        let cid = normalize_cid(cid);
        let separator = if path.is_empty() || path.starts_with('/') {
            ""
        } else {
            "/"
        };
        match self.style {
            UrlStyle::Subdomain => format!(
                "{}://{}.ipfs.{}{}{}",
                self.scheme.as_str(),
                cid,
                self.host,
                separator,
                path
            ),
            UrlStyle::Path => format!(
                "{}://{}/ipfs/{}{}{}",
                self.scheme.as_str(),
                self.host,
                cid,
                separator,
                path
            ),
        }
    }
}
