use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEvent {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl FileEntry {
    pub fn named(name: &str, body: Value) -> Self {
        Self {
            name: Some(name.to_string()),
            body: Some(body),
        }
    }

    pub fn unnamed(body: Value) -> Self {
        Self {
            name: None,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UploadResponse {
    pub files: String,
}

impl UploadResponse {
    pub fn from_names(names: &[String]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            files: serde_json::to_string(names)?,
        })
    }

    pub fn uploaded_names(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.files)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContextReport {
    pub invoked_function_arn: String,
    pub log_stream_name: String,
    pub log_group_name: String,
    pub aws_request_id: String,
    pub memory_limit_in_mb: u64,
    pub remaining_time_in_millis: u64,
}
