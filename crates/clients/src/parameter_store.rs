use async_trait::async_trait;
use lambda_models::ServiceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    StringList,
    SecureString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetParameterInput {
    pub name: String,
    pub with_decryption: bool,
}

impl GetParameterInput {
    pub fn decrypted(name: &str) -> Self {
        Self {
            name: name.to_string(),
            with_decryption: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutParameterInput {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub parameter_type: ParameterType,
    pub overwrite: bool,
}

impl PutParameterInput {
    pub fn secure(name: &str, value: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            description: Some(description.to_string()),
            parameter_type: ParameterType::SecureString,
            overwrite: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteParametersOutput {
    pub deleted_parameters: Vec<String>,
    pub invalid_parameters: Vec<String>,
}

#[async_trait]
pub trait ParameterStore: Send + Sync + 'static {
    async fn get_parameter(&self, input: GetParameterInput) -> Result<Parameter, ServiceError>;
    async fn put_parameter(&self, input: PutParameterInput) -> Result<u64, ServiceError>;
    async fn delete_parameters(&self, names: Vec<String>) -> Result<DeleteParametersOutput, ServiceError>;
}
