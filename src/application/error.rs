use thiserror::Error;

use crate::{config::LoadError, infra::error::InfraError};

/// Failures that stop the binary. The content layer itself never returns
/// errors; these come from bootstrap and output.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to write output: {0}")]
    Output(String),
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn output(err: impl std::fmt::Display) -> Self {
        Self::Output(err.to_string())
    }
}
