use lambda_clients::{ObjectRef, ObjectStore};
use lambda_models::LambdaError;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const DEFAULT_CONTENT: &str = "default content";

pub struct ResourceLoader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ResourceLoader {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn load(&self, key: &str) -> Result<String, LambdaError> {
        match self.store.get_object(ObjectRef::new(&self.bucket, key)).await? {
            Some(object) => {
                debug!(bytes = object.content_length(), "Loaded resource");
                Ok(String::from_utf8_lossy(&object.body).into_owned())
            }
            None => {
                debug!("Resource missing, using default content");
                Ok(DEFAULT_CONTENT.to_string())
            }
        }
    }
}
