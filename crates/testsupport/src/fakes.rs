use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use lambda_clients::{
    DeleteObjectInput, DeleteParametersOutput, GetObjectInput, GetObjectOutput, GetParameterInput,
    ListObjectsV2Output, ObjectStore, ObjectSummary, Parameter, ParameterStore, ParameterType,
    PutObjectInput, PutParameterInput, ServiceError,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const ENCRYPTED_PREFIX: &str = "kms:alias/aws/ssm:";

#[derive(Clone, Debug)]
struct StoredObject {
    body: Bytes,
    last_modified: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    buckets: Arc<Mutex<BTreeMap<String, BTreeMap<String, StoredObject>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.lock().await.contains_key(bucket)
    }

    pub async fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .lock()
            .await
            .get(bucket)
            .map(|objects| objects.len())
            .unwrap_or(0)
    }

    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .lock()
            .await
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn create_bucket(&self, bucket: &str) -> Result<(), ServiceError> {
        let mut buckets = self.buckets.lock().await;
        if buckets.contains_key(bucket) {
            return Err(ServiceError::BucketAlreadyExists {
                bucket: bucket.to_string(),
            });
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ServiceError> {
        let mut buckets = self.buckets.lock().await;
        match buckets.get(bucket) {
            None => Err(ServiceError::NoSuchBucket {
                bucket: bucket.to_string(),
            }),
            Some(objects) if !objects.is_empty() => Err(ServiceError::BucketNotEmpty {
                bucket: bucket.to_string(),
            }),
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn put_object(&self, input: PutObjectInput) -> Result<(), ServiceError> {
        let mut buckets = self.buckets.lock().await;
        let objects = buckets
            .get_mut(&input.bucket)
            .ok_or_else(|| ServiceError::NoSuchBucket {
                bucket: input.bucket.clone(),
            })?;
        objects.insert(
            input.key,
            StoredObject {
                body: input.body,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, input: GetObjectInput) -> Result<Option<GetObjectOutput>, ServiceError> {
        let buckets = self.buckets.lock().await;
        let objects = buckets
            .get(&input.bucket)
            .ok_or_else(|| ServiceError::NoSuchBucket {
                bucket: input.bucket.clone(),
            })?;
        let object = objects.get(&input.key).ok_or_else(|| ServiceError::NoSuchKey {
            key: input.key.clone(),
        })?;
        Ok(Some(GetObjectOutput {
            body: object.body.clone(),
            last_modified: object.last_modified,
        }))
    }

    async fn list_objects_v2(&self, bucket: &str) -> Result<ListObjectsV2Output, ServiceError> {
        let buckets = self.buckets.lock().await;
        let objects = buckets.get(bucket).ok_or_else(|| ServiceError::NoSuchBucket {
            bucket: bucket.to_string(),
        })?;
        let summaries = objects
            .iter()
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.body.len() as u64,
                last_modified: object.last_modified,
            })
            .collect();
        Ok(ListObjectsV2Output::from_summaries(summaries))
    }

    async fn delete_object(&self, input: DeleteObjectInput) -> Result<(), ServiceError> {
        let mut buckets = self.buckets.lock().await;
        let objects = buckets
            .get_mut(&input.bucket)
            .ok_or_else(|| ServiceError::NoSuchBucket {
                bucket: input.bucket.clone(),
            })?;
        // Deleting a missing key succeeds, as it does in S3.
        objects.remove(&input.key);
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct StoredParameter {
    value: String,
    parameter_type: ParameterType,
    version: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryParameterStore {
    parameters: Arc<Mutex<HashMap<String, StoredParameter>>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.parameters.lock().await.contains_key(name)
    }

    pub async fn len(&self) -> usize {
        self.parameters.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get_parameter(&self, input: GetParameterInput) -> Result<Parameter, ServiceError> {
        let parameters = self.parameters.lock().await;
        let stored = parameters
            .get(&input.name)
            .ok_or_else(|| ServiceError::ParameterNotFound {
                name: input.name.clone(),
            })?;
        let value = match stored.parameter_type {
            ParameterType::SecureString if !input.with_decryption => {
                format!("{ENCRYPTED_PREFIX}{}", stored.value)
            }
            _ => stored.value.clone(),
        };
        Ok(Parameter {
            name: input.name,
            value,
            parameter_type: stored.parameter_type,
            version: stored.version,
        })
    }

    async fn put_parameter(&self, input: PutParameterInput) -> Result<u64, ServiceError> {
        let mut parameters = self.parameters.lock().await;
        let version = match parameters.get(&input.name) {
            Some(_) if !input.overwrite => {
                return Err(ServiceError::ParameterAlreadyExists { name: input.name });
            }
            Some(existing) => existing.version + 1,
            None => 1,
        };
        parameters.insert(
            input.name,
            StoredParameter {
                value: input.value,
                parameter_type: input.parameter_type,
                version,
            },
        );
        Ok(version)
    }

    async fn delete_parameters(&self, names: Vec<String>) -> Result<DeleteParametersOutput, ServiceError> {
        let mut parameters = self.parameters.lock().await;
        let mut output = DeleteParametersOutput::default();
        for name in names {
            if parameters.remove(&name).is_some() {
                output.deleted_parameters.push(name);
            } else {
                output.invalid_parameters.push(name);
            }
        }
        Ok(output)
    }
}
