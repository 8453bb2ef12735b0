use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    #[error("expected an error with message {expected:?}, but the call returned normally with {returned}")]
    NoErrorRaised { expected: String, returned: String },

    #[error("error message mismatch: expected {expected:?}, got {actual:?}")]
    MessageMismatch { expected: String, actual: String },

    #[error("stub context has no attribute '{attribute}'")]
    MissingAttribute { attribute: &'static str },

    #[error("fixture setup failed: {reason}")]
    Setup { reason: String },

    #[error("fixture teardown failed: {reason}")]
    Teardown { reason: String },
}
