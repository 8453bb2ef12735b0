use lambda_harness::{override_environment, remove_environment, EnvScope};
use lambda_models::{FunctionConfig, ENV_ACCESS_KEY, ENV_BUCKET_KEY, ENV_REGION_KEY, ENV_SECRET_KEY};
use lambda_testsupport::ConfigOverride;
use std::io::Write;
use tempfile::NamedTempFile;

fn clear_function_env() -> EnvScope {
    let mut scope = EnvScope::new();
    for key in [ENV_BUCKET_KEY, ENV_ACCESS_KEY, ENV_SECRET_KEY, ENV_REGION_KEY] {
        scope.remove(key);
    }
    scope
}

#[test]
fn loads_config_file_written_from_override() -> anyhow::Result<()> {
    let _env = clear_function_env();
    let expected = ConfigOverride {
        bucket: Some("file-bucket".into()),
        region: Some("eu-west-1".into()),
        ..Default::default()
    }
    .build();

    let mut file = NamedTempFile::new()?;
    file.write_all(toml::to_string(&expected)?.as_bytes())?;

    let config = FunctionConfig::load(Some(file.path()))?;
    assert_eq!(config, expected);
    Ok(())
}

#[test]
fn overridden_environment_beats_file() -> anyhow::Result<()> {
    let mut env = clear_function_env();
    env.set(ENV_BUCKET_KEY, "env-bucket");

    let mut file = NamedTempFile::new()?;
    file.write_all(toml::to_string(&ConfigOverride::default().build())?.as_bytes())?;

    let config = FunctionConfig::load(Some(file.path()))?;
    assert_eq!(config.bucket, "env-bucket");
    assert_eq!(config.access_param, "s3-access-key");
    Ok(())
}

#[test]
fn missing_settings_fail_validation() {
    let _env = clear_function_env();
    let _bucket = override_environment(ENV_BUCKET_KEY, "test-bucket");
    let _secret = remove_environment(ENV_SECRET_KEY);

    let err = FunctionConfig::from_env().unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: S3_ACCESS_PARAM is not set");
    assert_eq!(err.error_type(), "ServiceException");
}
