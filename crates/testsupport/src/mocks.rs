use async_trait::async_trait;
use lambda_clients::{
    DeleteObjectInput, DeleteParametersOutput, GetObjectInput, GetObjectOutput, GetParameterInput,
    ListObjectsV2Output, ObjectStore, Parameter, ParameterStore, PutObjectInput, PutParameterInput,
    ServiceError,
};
use lambda_harness::Slot;
use std::sync::Arc;

use crate::fakes::{InMemoryObjectStore, InMemoryParameterStore};

/// Operations without an active substitution pass through to `inner`.
pub struct MockObjectStore {
    inner: Arc<dyn ObjectStore>,
    pub create_bucket: Slot<String, (), ServiceError>,
    pub delete_bucket: Slot<String, (), ServiceError>,
    pub put_object: Slot<PutObjectInput, (), ServiceError>,
    pub get_object: Slot<GetObjectInput, Option<GetObjectOutput>, ServiceError>,
    pub list_objects_v2: Slot<String, ListObjectsV2Output, ServiceError>,
    pub delete_object: Slot<DeleteObjectInput, (), ServiceError>,
}

impl MockObjectStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            create_bucket: Slot::new("create_bucket"),
            delete_bucket: Slot::new("delete_bucket"),
            put_object: Slot::new("put_object"),
            get_object: Slot::new("get_object"),
            list_objects_v2: Slot::new("list_objects_v2"),
            delete_object: Slot::new("delete_object"),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryObjectStore::new()))
    }

    pub fn inner(&self) -> Arc<dyn ObjectStore> {
        self.inner.clone()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn create_bucket(&self, bucket: &str) -> Result<(), ServiceError> {
        match self.create_bucket.intercept(&bucket.to_string()) {
            Some(result) => result,
            None => self.inner.create_bucket(bucket).await,
        }
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ServiceError> {
        match self.delete_bucket.intercept(&bucket.to_string()) {
            Some(result) => result,
            None => self.inner.delete_bucket(bucket).await,
        }
    }

    async fn put_object(&self, input: PutObjectInput) -> Result<(), ServiceError> {
        match self.put_object.intercept(&input) {
            Some(result) => result,
            None => self.inner.put_object(input).await,
        }
    }

    async fn get_object(&self, input: GetObjectInput) -> Result<Option<GetObjectOutput>, ServiceError> {
        match self.get_object.intercept(&input) {
            Some(result) => result,
            None => self.inner.get_object(input).await,
        }
    }

    async fn list_objects_v2(&self, bucket: &str) -> Result<ListObjectsV2Output, ServiceError> {
        match self.list_objects_v2.intercept(&bucket.to_string()) {
            Some(result) => result,
            None => self.inner.list_objects_v2(bucket).await,
        }
    }

    async fn delete_object(&self, input: DeleteObjectInput) -> Result<(), ServiceError> {
        match self.delete_object.intercept(&input) {
            Some(result) => result,
            None => self.inner.delete_object(input).await,
        }
    }
}

pub struct MockParameterStore {
    inner: Arc<dyn ParameterStore>,
    pub get_parameter: Slot<GetParameterInput, Parameter, ServiceError>,
    pub put_parameter: Slot<PutParameterInput, u64, ServiceError>,
    pub delete_parameters: Slot<Vec<String>, DeleteParametersOutput, ServiceError>,
}

impl MockParameterStore {
    pub fn new(inner: Arc<dyn ParameterStore>) -> Self {
        Self {
            inner,
            get_parameter: Slot::new("get_parameter"),
            put_parameter: Slot::new("put_parameter"),
            delete_parameters: Slot::new("delete_parameters"),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryParameterStore::new()))
    }
}

#[async_trait]
impl ParameterStore for MockParameterStore {
    async fn get_parameter(&self, input: GetParameterInput) -> Result<Parameter, ServiceError> {
        match self.get_parameter.intercept(&input) {
            Some(result) => result,
            None => self.inner.get_parameter(input).await,
        }
    }

    async fn put_parameter(&self, input: PutParameterInput) -> Result<u64, ServiceError> {
        match self.put_parameter.intercept(&input) {
            Some(result) => result,
            None => self.inner.put_parameter(input).await,
        }
    }

    async fn delete_parameters(&self, names: Vec<String>) -> Result<DeleteParametersOutput, ServiceError> {
        match self.delete_parameters.intercept(&names) {
            Some(result) => result,
            None => self.inner.delete_parameters(names).await,
        }
    }
}
