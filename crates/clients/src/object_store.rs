use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use lambda_models::ServiceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectInput {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
}

impl PutObjectInput {
    pub fn new(bucket: &str, key: &str, body: impl Into<Bytes>) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }
}

pub type GetObjectInput = ObjectRef;
pub type DeleteObjectInput = ObjectRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetObjectOutput {
    pub body: Bytes,
    pub last_modified: DateTime<Utc>,
}

impl GetObjectOutput {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            last_modified: Utc::now(),
        }
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// `contents` is absent, not empty, when the bucket holds no objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsV2Output {
    pub contents: Option<Vec<ObjectSummary>>,
    pub key_count: usize,
}

impl ListObjectsV2Output {
    pub fn from_summaries(summaries: Vec<ObjectSummary>) -> Self {
        let key_count = summaries.len();
        Self {
            contents: if summaries.is_empty() { None } else { Some(summaries) },
            key_count,
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn create_bucket(&self, bucket: &str) -> Result<(), ServiceError>;
    async fn delete_bucket(&self, bucket: &str) -> Result<(), ServiceError>;
    async fn put_object(&self, input: PutObjectInput) -> Result<(), ServiceError>;
    /// `Ok(None)` stands for a call that completed without a response.
    async fn get_object(&self, input: GetObjectInput) -> Result<Option<GetObjectOutput>, ServiceError>;
    async fn list_objects_v2(&self, bucket: &str) -> Result<ListObjectsV2Output, ServiceError>;
    async fn delete_object(&self, input: DeleteObjectInput) -> Result<(), ServiceError>;
}
