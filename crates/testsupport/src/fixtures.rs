use async_trait::async_trait;
use lambda_clients::{ObjectRef, ObjectStore, ParameterStore, PutParameterInput};
use lambda_harness::Fixture;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::fakes::{InMemoryObjectStore, InMemoryParameterStore};
use crate::mocks::{MockObjectStore, MockParameterStore};

pub const TEST_BUCKET: &str = "test-bucket";
pub const ACCESS_KEY_PARAM: &str = "s3-access-key";
pub const SECRET_KEY_PARAM: &str = "s3-secret-key";

#[derive(Clone)]
pub struct S3Env {
    pub store: Arc<MockObjectStore>,
    pub fake: InMemoryObjectStore,
    pub bucket: String,
}

impl S3Env {
    pub fn client(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }
}

#[derive(Debug, Clone)]
pub struct S3Fixture {
    pub bucket: String,
}

impl Default for S3Fixture {
    fn default() -> Self {
        Self {
            bucket: TEST_BUCKET.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl Fixture for S3Fixture {
    type Value = S3Env;

    async fn setup(&self) -> anyhow::Result<S3Env> {
        debug!(bucket = %self.bucket, "Setup s3 bucket");
        let fake = InMemoryObjectStore::new();
        fake.create_bucket(&self.bucket).await?;
        Ok(S3Env {
            store: Arc::new(MockObjectStore::new(Arc::new(fake.clone()))),
            fake,
            bucket: self.bucket.clone(),
        })
    }

    async fn teardown(&self, env: S3Env) -> anyhow::Result<()> {
        debug!(bucket = %env.bucket, "Teardown s3 bucket");
        // Every object has to go before the bucket can.
        for key in env.fake.keys(&env.bucket).await {
            env.fake.delete_object(ObjectRef::new(&env.bucket, &key)).await?;
        }
        env.fake.delete_bucket(&env.bucket).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SsmEnv {
    pub store: Arc<MockParameterStore>,
    pub fake: InMemoryParameterStore,
    pub access_key: String,
    pub secret_key: String,
}

impl SsmEnv {
    pub fn client(&self) -> Arc<dyn ParameterStore> {
        self.store.clone()
    }
}

#[derive(Debug, Clone)]
pub struct SsmFixture {
    pub bucket: String,
    pub access_param: String,
    pub secret_param: String,
}

impl Default for SsmFixture {
    fn default() -> Self {
        Self {
            bucket: TEST_BUCKET.to_string(),
            access_param: ACCESS_KEY_PARAM.to_string(),
            secret_param: SECRET_KEY_PARAM.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl Fixture for SsmFixture {
    type Value = SsmEnv;

    async fn setup(&self) -> anyhow::Result<SsmEnv> {
        debug!("Setup ssm parameter store");
        let fake = InMemoryParameterStore::new();
        // Generated per run, never hardcoded.
        let access_key = Uuid::new_v4().to_string();
        let secret_key = Uuid::new_v4().to_string();

        fake.put_parameter(PutParameterInput::secure(
            &self.access_param,
            &access_key,
            &format!("access key for s3 bucket {}", self.bucket),
        ))
        .await?;
        fake.put_parameter(PutParameterInput::secure(
            &self.secret_param,
            &secret_key,
            &format!("secret key for s3 bucket {}", self.bucket),
        ))
        .await?;

        Ok(SsmEnv {
            store: Arc::new(MockParameterStore::new(Arc::new(fake.clone()))),
            fake,
            access_key,
            secret_key,
        })
    }

    async fn teardown(&self, env: SsmEnv) -> anyhow::Result<()> {
        debug!("Teardown ssm parameter store");
        env.fake
            .delete_parameters(vec![self.access_param.clone(), self.secret_param.clone()])
            .await?;
        Ok(())
    }
}
