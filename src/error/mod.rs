mod app;
mod config;
mod dial;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use dial::{ContextError, DialError};
pub use validation::ValidationError;
