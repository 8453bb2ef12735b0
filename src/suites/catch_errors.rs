use lambda_clients::{ObjectRef, ObjectStore, PutObjectInput, ServiceError};
use lambda_functions::ObjectService;
use lambda_harness::{expect_error_async, substitute_call, Behavior, Group, Suite, TestCase};
use lambda_testsupport::{test_config, S3Env, S3Fixture, SsmEnv, SsmFixture};
use serde_json::{json, Value};
use tracing::debug;

fn fixtures() -> (S3Fixture, SsmFixture) {
    (S3Fixture::default(), SsmFixture::default())
}

async fn catch_errors_module(s3: &S3Env, ssm: &SsmEnv) -> anyhow::Result<ObjectService> {
    let client = s3.client();
    let service = ObjectService::bootstrap(ssm.client().as_ref(), test_config(), move |creds, region| {
        debug!(access_key_id = %creds.access_key_id, region, "Connecting S3 client");
        client
    })
    .await?;
    Ok(service)
}

pub fn suite() -> Suite {
    Suite::new("catch_errors")
        .group(
            Group::new("TestMyPutObject")
                .case(TestCase::with_fixture(
                    "test_put_success",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let service = catch_errors_module(&s3, &ssm).await?;
                        let expected = json!({"key": "test_put_success"});
                        service.put_object("k1", &expected.to_string()).await?;

                        let object = s3
                            .fake
                            .get_object(ObjectRef::new(&s3.bucket, "k1"))
                            .await?
                            .ok_or_else(|| anyhow::anyhow!("k1 was not stored"))?;
                        let result: Value = serde_json::from_slice(&object.body)?;
                        debug!(%result, %expected, "Comparing stored object");
                        assert_eq!(result, expected);
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_put_error",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let service = catch_errors_module(&s3, &ssm).await?;
                        let expected = "[TEST] exception message for test_put_error";
                        let _guard = substitute_call(
                            &s3.store.put_object,
                            Behavior::raises(ServiceError::raised(expected)),
                        );
                        expect_error_async(service.put_object("k1", "{}"), expected).await?;
                        Ok::<_, anyhow::Error>(())
                    },
                )),
        )
        .group(
            Group::new("TestMyGetObject")
                .case(TestCase::with_fixture(
                    "test_get_success",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let expected = json!({"key": "test_get_success"});
                        s3.fake
                            .put_object(PutObjectInput::new(&s3.bucket, "k1", expected.to_string()))
                            .await?;
                        let service = catch_errors_module(&s3, &ssm).await?;
                        assert_eq!(service.get_object("k1").await, Some(expected));
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_get_error",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let service = catch_errors_module(&s3, &ssm).await?;
                        let _guard = substitute_call(
                            &s3.store.get_object,
                            Behavior::raises(ServiceError::raised("[TEST] exception message for test_get_error")),
                        );
                        assert_eq!(service.get_object("k1").await, None);
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_get_no_response",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let service = catch_errors_module(&s3, &ssm).await?;
                        let _guard = substitute_call(&s3.store.get_object, Behavior::returns(None));
                        assert_eq!(service.get_object("k1").await, None);
                        Ok::<_, anyhow::Error>(())
                    },
                )),
        )
        .group(
            Group::new("TestMyListObjectsV2")
                .case(TestCase::with_fixture(
                    "test_list_success",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let service = catch_errors_module(&s3, &ssm).await?;
                        service.put_object("k1", r#"{"key": "test_list_success"}"#).await?;

                        let contents = service
                            .list_objects()
                            .await?
                            .ok_or_else(|| anyhow::anyhow!("listing failed"))?;
                        assert_eq!(contents.len(), 1);
                        assert_eq!(contents[0].key, "k1");
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_list_error",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let service = catch_errors_module(&s3, &ssm).await?;
                        let _guard = substitute_call(
                            &s3.store.list_objects_v2,
                            Behavior::raises(ServiceError::raised("[TEST] exception message for test_list_error")),
                        );
                        assert_eq!(service.list_objects().await?, None);
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_list_no_contents",
                    fixtures(),
                    |(s3, ssm): (S3Env, SsmEnv)| async move {
                        let service = catch_errors_module(&s3, &ssm).await?;
                        expect_error_async(service.list_objects(), "Bucket empty").await?;
                        Ok::<_, anyhow::Error>(())
                    },
                )),
        )
}
