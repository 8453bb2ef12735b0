use lambda_clients::{GetObjectInput, GetObjectOutput, ServiceError};
use lambda_functions::{ResourceLoader, DEFAULT_CONTENT};
use lambda_harness::{
    expect_error_async, override_environment, remove_environment, substitute_call, Behavior, Group, Suite, TestCase,
};
use lambda_models::{FunctionConfig, LambdaError, ENV_REGION_KEY};
use lambda_testsupport::{S3Env, S3Fixture};
use tracing::debug;

const PROBE_KEY: &str = "LAMBDA_TESTKIT_PROBE";

pub fn suite() -> Suite {
    Suite::new("harness")
        .group(
            Group::new("TestOverrideEnvironment")
                .case(TestCase::new("test_override_visible_during_case", || async {
                    let _env = override_environment(PROBE_KEY, "overridden");
                    assert_eq!(std::env::var(PROBE_KEY).ok().as_deref(), Some("overridden"));
                    Ok::<_, anyhow::Error>(())
                }))
                .case(TestCase::new("test_override_reverted_after_case", || async {
                    // Runs after the case above; its override must be gone.
                    assert!(std::env::var(PROBE_KEY).is_err());
                    Ok::<_, anyhow::Error>(())
                }))
                .case(TestCase::new("test_region_defaults_when_unset", || async {
                    let _env = remove_environment(ENV_REGION_KEY);
                    let config = FunctionConfig::figment(None).extract::<FunctionConfig>()?;
                    assert_eq!(config.region, "us-east-1");
                    Ok::<_, anyhow::Error>(())
                })),
        )
        .group(
            Group::new("TestSubstituteCall")
                .case(TestCase::with_fixture(
                    "test_missing_resource_returns_default",
                    S3Fixture::default(),
                    |s3: S3Env| async move {
                        let loader = ResourceLoader::new(s3.client(), &s3.bucket);
                        let _guard = substitute_call(&s3.store.get_object, Behavior::returns(None));
                        assert_eq!(loader.load("missing.txt").await?, DEFAULT_CONTENT);
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_fetch_error_is_captured",
                    S3Fixture::default(),
                    |s3: S3Env| async move {
                        let loader = ResourceLoader::new(s3.client(), &s3.bucket);
                        let _guard = substitute_call(
                            &s3.store.get_object,
                            Behavior::raises(ServiceError::raised("Resource unavailable")),
                        );
                        let err = expect_error_async(loader.load("config.json"), "Resource unavailable").await?;
                        debug!(error = %err, "Captured");
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_replacement_receives_arguments",
                    S3Fixture::default(),
                    |s3: S3Env| async move {
                        let loader = ResourceLoader::new(s3.client(), &s3.bucket);
                        let _guard = substitute_call(
                            &s3.store.get_object,
                            Behavior::calls(|input: GetObjectInput| {
                                Ok(Some(GetObjectOutput::new(format!("{}/{}", input.bucket, input.key))))
                            }),
                        );
                        assert_eq!(loader.load("a.txt").await?, "test-bucket/a.txt");
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_substitution_reverted_after_case",
                    S3Fixture::default(),
                    |s3: S3Env| async move {
                        // Each case gets fresh doubles, and nothing substituted above leaks in.
                        assert!(!s3.store.get_object.is_substituted());
                        let loader = ResourceLoader::new(s3.client(), &s3.bucket);
                        let err = loader.load("missing.txt").await.err();
                        assert!(matches!(
                            err,
                            Some(LambdaError::Service(ServiceError::NoSuchKey { .. }))
                        ));
                        Ok::<_, anyhow::Error>(())
                    },
                )),
        )
}
