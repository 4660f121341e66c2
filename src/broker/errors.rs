// Broker Errors - typed lifecycle failures and harness-injected ones

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Arbitrary failure a test harness substitutes for an operation's result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedFailure {
    pub message: String,
    /// Status the boundary layer should answer with, if the harness cares
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Machine-readable error key for the response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
}

impl InjectedFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            error_key: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_error_key(mut self, error_key: impl Into<String>) -> Self {
        self.error_key = Some(error_key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("instance already exists")]
    InstanceAlreadyExists,
    #[error("instance limit for this service has been reached")]
    InstanceLimitReached,
    #[error("This service plan requires client support for asynchronous service operations.")]
    AsyncRequired,
    #[error("instance does not exist")]
    InstanceDoesNotExist,
    #[error("binding already exists")]
    BindingAlreadyExists,
    #[error("{}", .0.message)]
    Injected(InjectedFailure),
}

impl BrokerError {
    pub fn injected(message: impl Into<String>) -> Self {
        BrokerError::Injected(InjectedFailure::new(message))
    }

    pub fn is_injected(&self) -> bool {
        matches!(self, BrokerError::Injected(_))
    }
}

impl From<InjectedFailure> for BrokerError {
    fn from(failure: InjectedFailure) -> Self {
        BrokerError::Injected(failure)
    }
}

pub type BrokerResult<T> = Result<T, BrokerError>;
