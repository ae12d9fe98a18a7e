pub(crate) const DEFAULT_USER_AGENT: &str = concat!("gateway-replay/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_CONCURRENCY: &str = "2";
pub(crate) const DEFAULT_QUEUE_HIGH: &str = "500";
pub(crate) const DEFAULT_QUEUE_LOW: &str = "200";
pub(crate) const DEFAULT_MIN_SPACING: &str = "50ms";
pub(crate) const DEFAULT_SPACING_PENALTY: &str = "200ms";
pub(crate) const DEFAULT_REQUEST_TIMEOUT: &str = "15s";
pub(crate) const DEFAULT_CONNECT_TIMEOUT: &str = "5s";
pub(crate) const DEFAULT_PROGRESS_INTERVAL: &str = "5s";
pub(crate) const DEFAULT_REDIRECT_LIMIT: &str = "10";
