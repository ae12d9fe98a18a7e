mod app;
mod config;
mod http;
mod records;
mod sink;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use records::RecordError;
pub use sink::SinkError;
pub use validation::ValidationError;
