pub mod config;
pub mod context;
pub mod error;
pub mod events;

pub use config::*;
pub use context::*;
pub use error::*;
pub use events::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_upload_event_accepts_extra_file_fields() {
        let json = r#"{
            "files": [
                {"count": 20, "body": {"description": "dev"}},
                {"name": "file-2", "body": {"success": true}}
            ]
        }"#;

        let event: UploadEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.files.len(), 2);
        assert!(event.files[0].name.is_none());
        assert_eq!(event.files[1].name.as_deref(), Some("file-2"));
    }

    #[test]
    fn test_upload_event_requires_files() {
        let result: Result<UploadEvent, _> = serde_json::from_str("{}");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing field"));
    }

    #[test]
    fn test_upload_response_uploaded_names() {
        let response = UploadResponse::from_names(&["file-1".to_string(), "file-3".to_string()]).unwrap();
        assert_eq!(response.files, r#"["file-1","file-3"]"#);
        assert_eq!(response.uploaded_names().unwrap(), vec!["file-1", "file-3"]);
    }

    #[test]
    fn test_error_shape_serde() {
        let error = LambdaError::BucketEmpty;
        let shape = error.to_error_shape();

        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["errorMessage"], "Bucket empty");
        assert_eq!(json["errorType"], "BucketEmptyException");

        let deserialized: ErrorShape = serde_json::from_value(json).unwrap();
        assert_eq!(shape.error_message, deserialized.error_message);
        assert_eq!(shape.error_type, deserialized.error_type);
    }

    #[test]
    fn test_service_error_message_passes_through() {
        let error: LambdaError = ServiceError::raised("Resource unavailable").into();
        assert_eq!(error.to_string(), "Resource unavailable");
        assert_eq!(error.error_type(), "Unhandled");
    }
}
