use chrono::Utc;
use lambda_clients::{ObjectRef, ObjectStore};
use serde_json::{json, Value};
use std::sync::Once;
use tracing::Level;

static INIT_LOGGING: Once = Once::new();

pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(Level::DEBUG)
            .try_init();
    });
}

pub fn sample_body(description: &str, success: bool) -> Value {
    json!({
        "creationTime": Utc::now().timestamp_millis() as f64 / 1000.0,
        "description": description,
        "success": success,
    })
}

pub fn without_id(mut value: Value) -> Value {
    if let Some(object) = value.as_object_mut() {
        object.remove("id");
    }
    value
}

pub async fn read_json(store: &dyn ObjectStore, bucket: &str, key: &str) -> anyhow::Result<Value> {
    let object = store
        .get_object(ObjectRef::new(bucket, key))
        .await?
        .ok_or_else(|| anyhow::anyhow!("object {key} returned no body"))?;
    Ok(serde_json::from_slice(&object.body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_id_drops_only_id() {
        let value = without_id(json!({"id": "x", "count": 10}));
        assert_eq!(value, json!({"count": 10}));
    }

    #[test]
    fn sample_body_has_expected_fields() {
        let body = sample_body("dev", false);
        assert_eq!(body["description"], "dev");
        assert_eq!(body["success"], false);
        assert!(body["creationTime"].is_f64());
    }
}
