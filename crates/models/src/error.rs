use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ErrorShape {
    pub error_message: String,
    pub error_type: String,
    pub stack_trace: Option<Vec<String>>,
}

/// `Raised` carries an arbitrary message and displays it verbatim, so an
/// error injected by a test surfaces with exactly the text it was given.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket { bucket: String },

    #[error("The specified bucket already exists: {bucket}")]
    BucketAlreadyExists { bucket: String },

    #[error("The bucket you tried to delete is not empty: {bucket}")]
    BucketNotEmpty { bucket: String },

    #[error("The specified key does not exist: {key}")]
    NoSuchKey { key: String },

    #[error("Parameter {name} not found")]
    ParameterNotFound { name: String },

    #[error("Parameter {name} already exists")]
    ParameterAlreadyExists { name: String },

    #[error("{0}")]
    Raised(String),
}

impl ServiceError {
    pub fn raised(message: impl Into<String>) -> Self {
        ServiceError::Raised(message.into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NoSuchBucket { .. } => "NoSuchBucket",
            ServiceError::BucketAlreadyExists { .. } => "BucketAlreadyExists",
            ServiceError::BucketNotEmpty { .. } => "BucketNotEmpty",
            ServiceError::NoSuchKey { .. } => "NoSuchKey",
            ServiceError::ParameterNotFound { .. } => "ParameterNotFound",
            ServiceError::ParameterAlreadyExists { .. } => "ParameterAlreadyExists",
            ServiceError::Raised(_) => "Exception",
        }
    }
}

#[derive(Error, Debug)]
pub enum LambdaError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Bucket empty")]
    BucketEmpty,

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

impl LambdaError {
    pub fn to_error_shape(&self) -> ErrorShape {
        ErrorShape {
            error_message: self.to_string(),
            error_type: self.error_type().to_string(),
            stack_trace: None,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            LambdaError::Service(_) => "Unhandled",
            LambdaError::BucketEmpty => "BucketEmptyException",
            LambdaError::InvalidRequest { .. } => "InvalidParameterValueException",
            LambdaError::Serialization(_) => "InvalidParameterValueException",
            LambdaError::ConfigError { .. } => "ServiceException",
        }
    }
}
