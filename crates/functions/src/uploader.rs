use chrono::{NaiveDate, Utc};
use lambda_clients::{ObjectStore, PutObjectInput};
use lambda_models::{FileEntry, FunctionConfig, LambdaError, UploadEvent, UploadResponse};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const COUNT_INCREMENT: i64 = 10;

pub fn construct_file_path(file_name: &str) -> String {
    construct_file_path_at(file_name, Utc::now().date_naive(), Uuid::new_v4())
}

pub fn construct_file_path_at(file_name: &str, date: NaiveDate, id: Uuid) -> String {
    format!("{}/{}/{}", date.format("%Y/%m/%d"), id, file_name)
}

pub fn key_id(key: &str) -> Option<&str> {
    key.rsplit('/').nth(1)
}

pub fn construct_json(body: Value, id: &str) -> Result<String, LambdaError> {
    let Value::Object(mut body) = body else {
        return Err(LambdaError::InvalidRequest {
            reason: "file body must be a JSON object".to_string(),
        });
    };

    let count = match body.get("count") {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => bump_count(n),
        _ => Value::from(COUNT_INCREMENT),
    };

    body.insert("id".to_string(), Value::String(id.to_string()));
    body.insert("count".to_string(), count);
    Ok(serde_json::to_string(&body)?)
}

// i128 holds every JSON integer plus the increment; only u64::MAX overflows.
fn bump_count(n: &serde_json::Number) -> Value {
    let current = n
        .as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
        .unwrap_or_default();
    let bumped = current + i128::from(COUNT_INCREMENT);
    match i64::try_from(bumped) {
        Ok(v) => Value::from(v),
        Err(_) => Value::from(u64::try_from(bumped).unwrap_or(u64::MAX)),
    }
}

pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    config: FunctionConfig,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, config: FunctionConfig) -> Self {
        Self { store, config }
    }

    #[instrument(skip(self, event), fields(bucket = %self.config.bucket, files = event.files.len()))]
    pub async fn handle(&self, event: UploadEvent) -> Result<UploadResponse, LambdaError> {
        let mut files_uploaded = Vec::new();
        let mut files_not_uploaded = 0usize;

        for file in event.files {
            match file {
                FileEntry { name: Some(name), body } => {
                    self.upload(&name, body).await?;
                    files_uploaded.push(name);
                }
                FileEntry { name: None, .. } => files_not_uploaded += 1,
            }
        }

        info!(files_not_uploaded, "{} files not uploaded", files_not_uploaded);
        Ok(UploadResponse::from_names(&files_uploaded)?)
    }

    pub async fn handle_value(&self, event: Value) -> Result<Value, LambdaError> {
        let event: UploadEvent = serde_json::from_value(event)?;
        let response = self.handle(event).await?;
        Ok(serde_json::to_value(response)?)
    }

    async fn upload(&self, name: &str, body: Option<Value>) -> Result<(), LambdaError> {
        let body = body.ok_or_else(|| LambdaError::InvalidRequest {
            reason: format!("file {name} has no body"),
        })?;

        let key = construct_file_path(name);
        let id = key_id(&key).unwrap_or_default().to_string();
        let json = construct_json(body, &id)?;

        self.store
            .put_object(PutObjectInput::new(&self.config.bucket, &key, json.into_bytes()))
            .await?;
        info!(key = %key, id = %id, "Uploaded file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_harness::{expect_error, substitute_call, with_fixture, Behavior};
    use lambda_testsupport::{init_test_logging, read_json, sample_body, test_config, without_id, S3Fixture};
    use lambda_clients::ServiceError;
    use serde_json::json;

    fn today() -> String {
        Utc::now().date_naive().format("%Y/%m/%d").to_string()
    }

    #[test]
    fn test_empty_file_name() {
        let path = construct_file_path("");
        let prefix = format!("{}/", today());
        assert!(path.starts_with(&prefix), "{path} should start with {prefix}");
        assert!(path.ends_with('/'));
        let id = key_id(&path).unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_path_constructed() {
        let id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let path = construct_file_path_at("my-file-name", date, id);
        assert_eq!(path, format!("2024/03/07/{id}/my-file-name"));
        assert_eq!(key_id(&path), Some(id.to_string().as_str()));
    }

    #[test]
    fn test_count_not_in_body() {
        let id = Uuid::new_v4().to_string();
        let result: Value = serde_json::from_str(&construct_json(json!({}), &id).unwrap()).unwrap();
        assert_eq!(result, json!({"id": id, "count": 10}));
    }

    #[test]
    fn test_count_int_in_body() {
        let id = Uuid::new_v4().to_string();
        let result = construct_json(json!({"id": "temp", "count": 7}), &id).unwrap();
        let result: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(result, json!({"id": id, "count": 17}));
    }

    #[test]
    fn test_count_invalid_types_reset_to_ten() {
        for count in [json!(9.9), json!(""), json!(null), json!([1])] {
            let result = construct_json(json!({"id": "temp", "count": count}), "abc").unwrap();
            let result: Value = serde_json::from_str(&result).unwrap();
            assert_eq!(result, json!({"id": "abc", "count": 10}), "count {count}");
        }
    }

    #[test]
    fn test_count_near_integer_limits() {
        let bumped = |count: Value| -> Value {
            let result = construct_json(json!({"count": count}), "abc").unwrap();
            serde_json::from_str::<Value>(&result).unwrap()["count"].clone()
        };
        assert_eq!(bumped(json!(-3)), json!(7));
        assert_eq!(bumped(json!(i64::MAX - 5)), json!(i64::MAX as u64 + 5));
        assert_eq!(bumped(json!(u64::MAX - 100)), json!(u64::MAX - 90));
        assert_eq!(bumped(json!(u64::MAX - 3)), json!(u64::MAX));
    }

    #[test]
    fn test_boolean_count_is_not_an_integer() {
        for count in [json!(true), json!(false)] {
            let result = construct_json(json!({"count": count}), "abc").unwrap();
            let result: Value = serde_json::from_str(&result).unwrap();
            assert_eq!(result["count"], json!(10));
        }
    }

    #[test]
    fn test_non_object_body_rejected() {
        let err = expect_error(|| construct_json(json!([1, 2]), "abc"), "Invalid request: file body must be a JSON object");
        assert!(err.is_ok());
    }

    #[tokio::test]
    async fn test_one_file() {
        init_test_logging();
        with_fixture(&S3Fixture::default(), |s3| async move {
            let uploader = Uploader::new(s3.client(), test_config());
            let body = sample_body("test", true);
            let event = UploadEvent {
                files: vec![FileEntry::named("file-1", body.clone())],
            };

            let response = uploader.handle(event).await?;
            assert_eq!(response.uploaded_names()?, vec!["file-1"]);

            let keys = s3.fake.keys(&s3.bucket).await;
            assert_eq!(keys.len(), 1);
            assert!(keys[0].ends_with("/file-1"));

            let stored = read_json(&s3.fake, &s3.bucket, &keys[0]).await?;
            assert_eq!(stored["id"], key_id(&keys[0]).unwrap());
            let mut expected = body;
            expected["count"] = json!(10);
            assert_eq!(without_id(stored), expected);
            Ok::<_, anyhow::Error>(())
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_put_error_propagates() {
        with_fixture(&S3Fixture::default(), |s3| async move {
            let _guard = substitute_call(
                &s3.store.put_object,
                Behavior::raises(ServiceError::raised("Access Denied")),
            );
            let uploader = Uploader::new(s3.client(), test_config());
            let event = UploadEvent {
                files: vec![FileEntry::named("file-1", json!({}))],
            };

            let err = uploader.handle(event).await.unwrap_err();
            assert_eq!(err.to_string(), "Access Denied");
            assert_eq!(s3.fake.object_count(&s3.bucket).await, 0);
            Ok(())
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_handle_value_parses_raw_event() {
        with_fixture(&S3Fixture::default(), |s3| async move {
            let uploader = Uploader::new(s3.client(), test_config());
            let response = uploader
                .handle_value(json!({"files": [{"name": "a", "body": {}}, {"body": {}}]}))
                .await?;
            assert_eq!(response, json!({"files": "[\"a\"]"}));

            let err = uploader.handle_value(json!({"nope": []})).await.unwrap_err();
            assert!(matches!(err, LambdaError::Serialization(_)));
            Ok::<_, anyhow::Error>(())
        })
        .await
        .unwrap();
    }
}
