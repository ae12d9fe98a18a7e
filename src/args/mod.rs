//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub use cli::{
    Command, ReplayArgs, SaturateArgs, SplitArgs, StartArgs, StartW3Args, TransformArgs,
};
pub use types::{GatewayScheme, PositiveUsize, UrlStyle};

pub(crate) use defaults::DEFAULT_USER_AGENT;
