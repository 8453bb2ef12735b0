use lambda_clients::{
    GetParameterInput, ObjectRef, ObjectStore, ObjectSummary, ParameterStore, PutObjectInput,
};
use lambda_models::{FunctionConfig, LambdaError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

pub async fn resolve_credentials(
    params: &dyn ParameterStore,
    config: &FunctionConfig,
) -> Result<Credentials, LambdaError> {
    let access = params
        .get_parameter(GetParameterInput::decrypted(&config.access_param))
        .await?;
    let secret = params
        .get_parameter(GetParameterInput::decrypted(&config.secret_param))
        .await?;
    debug!(access_param = %config.access_param, secret_param = %config.secret_param, "Resolved S3 credentials");
    Ok(Credentials {
        access_key_id: access.value,
        secret_access_key: secret.value,
    })
}

pub struct ObjectService {
    store: Arc<dyn ObjectStore>,
    config: FunctionConfig,
}

impl ObjectService {
    pub fn new(store: Arc<dyn ObjectStore>, config: FunctionConfig) -> Self {
        Self { store, config }
    }

    pub async fn bootstrap<C>(
        params: &dyn ParameterStore,
        config: FunctionConfig,
        connect: C,
    ) -> Result<Self, LambdaError>
    where
        C: FnOnce(&Credentials, &str) -> Arc<dyn ObjectStore>,
    {
        config.validate()?;
        let credentials = resolve_credentials(params, &config).await?;
        let store = connect(&credentials, &config.region);
        Ok(Self::new(store, config))
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    #[instrument(skip(self, body), fields(bucket = %self.config.bucket))]
    pub async fn put_object(&self, key: &str, body: &str) -> Result<(), LambdaError> {
        self.store
            .put_object(PutObjectInput::new(&self.config.bucket, key, body.as_bytes().to_vec()))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn get_object(&self, key: &str) -> Option<Value> {
        let response = match self.store.get_object(ObjectRef::new(&self.config.bucket, key)).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                warn!("get_object returned no response");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "get_object failed");
                return None;
            }
        };

        match serde_json::from_slice(&response.body) {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(error = %e, "Object body is not JSON");
                None
            }
        }
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn list_objects(&self) -> Result<Option<Vec<ObjectSummary>>, LambdaError> {
        let response = match self.store.list_objects_v2(&self.config.bucket).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "list_objects_v2 failed");
                return Ok(None);
            }
        };

        match response.contents {
            Some(contents) => Ok(Some(contents)),
            None => Err(LambdaError::BucketEmpty),
        }
    }
}
