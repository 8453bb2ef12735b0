use chrono::Utc;
use lambda_functions::{construct_file_path, construct_json, key_id, Uploader};
use lambda_harness::{EnvScope, Group, Suite, TestCase};
use lambda_models::{FunctionConfig, UploadEvent, ENV_ACCESS_KEY, ENV_BUCKET_KEY, ENV_SECRET_KEY};
use lambda_testsupport::{read_json, sample_body, without_id, S3Env, S3Fixture, SsmEnv, SsmFixture};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

fn fixtures() -> (S3Fixture, SsmFixture) {
    (S3Fixture::default(), SsmFixture::default())
}

fn mocked_uploader(s3: &S3Env, ssm: &SsmFixture) -> anyhow::Result<Uploader> {
    let mut env = EnvScope::new();
    env.set(ENV_BUCKET_KEY, &s3.bucket)
        .set(ENV_ACCESS_KEY, &ssm.access_param)
        .set(ENV_SECRET_KEY, &ssm.secret_param);
    let config = FunctionConfig::from_env()?;
    Ok(Uploader::new(s3.client(), config))
}

async fn handle(s3: &S3Env, event: Value) -> anyhow::Result<Vec<String>> {
    let uploader = mocked_uploader(s3, &SsmFixture::default())?;
    let event: UploadEvent = serde_json::from_value(event)?;
    let response = uploader.handle(event).await?;
    debug!(files = %response.files, "Handler result");
    Ok(response.uploaded_names()?)
}

async fn stored_bodies(s3: &S3Env, names: &[&str]) -> anyhow::Result<Vec<Value>> {
    let keys = s3.fake.keys(&s3.bucket).await;
    anyhow::ensure!(keys.len() == names.len(), "expected {} objects, found {}", names.len(), keys.len());

    let mut bodies = Vec::new();
    for name in names {
        let key = keys
            .iter()
            .find(|k| k.ends_with(&format!("/{name}")))
            .ok_or_else(|| anyhow::anyhow!("no object stored for {name}"))?;
        let body = read_json(&s3.fake, &s3.bucket, key).await?;
        anyhow::ensure!(body["id"] == json!(key_id(key)), "id of {key} does not match its key");
        bodies.push(without_id(body));
    }
    Ok(bodies)
}

fn with_count(mut body: Value, count: i64) -> Value {
    body["count"] = json!(count);
    body
}

pub fn suite() -> Suite {
    Suite::new("uploader")
        .group(
            Group::new("TestConstructFilePath")
                .case(TestCase::new("test_empty_fn", || async {
                    let path = construct_file_path("");
                    let today = Utc::now().date_naive().format("%Y/%m/%d").to_string();
                    debug!(path = %path, "Constructed path");
                    anyhow::ensure!(path.starts_with(&today), "{path} does not start with {today}");
                    anyhow::ensure!(path.ends_with('/'), "{path} should end with an empty name");
                    Ok::<_, anyhow::Error>(())
                }))
                .case(TestCase::new("test_path_constructed", || async {
                    let path = construct_file_path("my-file-name");
                    let id = key_id(&path).ok_or_else(|| anyhow::anyhow!("no id in {path}"))?;
                    Uuid::parse_str(id)?;
                    anyhow::ensure!(path.ends_with(&format!("{id}/my-file-name")));
                    Ok::<_, anyhow::Error>(())
                })),
        )
        .group(
            Group::new("TestConstructJson")
                .case(TestCase::new("test_count_not_in_body", || async {
                    let result: Value = serde_json::from_str(&construct_json(json!({}), "abc")?)?;
                    assert_eq!(result, json!({"id": "abc", "count": 10}));
                    Ok::<_, anyhow::Error>(())
                }))
                .case(TestCase::new("test_count_int_in_body", || async {
                    let result: Value = serde_json::from_str(&construct_json(json!({"count": 7}), "abc")?)?;
                    assert_eq!(result, json!({"id": "abc", "count": 17}));
                    Ok::<_, anyhow::Error>(())
                }))
                .case(TestCase::new("test_count_double_in_body", || async {
                    let result: Value = serde_json::from_str(&construct_json(json!({"count": 7.5}), "abc")?)?;
                    assert_eq!(result["count"], 10);
                    Ok::<_, anyhow::Error>(())
                }))
                .case(TestCase::new("test_count_str_in_body", || async {
                    let result: Value = serde_json::from_str(&construct_json(json!({"count": "7"}), "abc")?)?;
                    assert_eq!(result["count"], 10);
                    Ok::<_, anyhow::Error>(())
                })),
        )
        .group(
            Group::new("TestLambdaHandler")
                .case(TestCase::with_fixture(
                    "test_no_files",
                    fixtures(),
                    |(s3, _ssm): (S3Env, SsmEnv)| async move {
                        let names = handle(&s3, json!({"files": []})).await?;
                        assert!(names.is_empty());
                        assert_eq!(s3.fake.object_count(&s3.bucket).await, 0);
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_one_file",
                    fixtures(),
                    |(s3, _ssm): (S3Env, SsmEnv)| async move {
                        let body = sample_body("test", true);
                        let names = handle(&s3, json!({"files": [{"name": "file-1", "body": body}]})).await?;
                        assert_eq!(names, vec!["file-1"]);

                        let stored = stored_bodies(&s3, &["file-1"]).await?;
                        assert_eq!(stored, vec![with_count(body, 10)]);
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_multiple_files",
                    fixtures(),
                    |(s3, _ssm): (S3Env, SsmEnv)| async move {
                        let body1 = sample_body("test", true);
                        let body2 = with_count(sample_body("dev", false), 20);
                        let body3 = sample_body("prod", true);
                        let event = json!({"files": [
                            {"name": "file-1", "body": body1},
                            {"name": "file-2", "body": body2},
                            {"name": "file-3", "body": body3},
                        ]});

                        let names = handle(&s3, event).await?;
                        assert_eq!(names, vec!["file-1", "file-2", "file-3"]);

                        let stored = stored_bodies(&s3, &["file-1", "file-2", "file-3"]).await?;
                        assert_eq!(
                            stored,
                            vec![with_count(body1, 10), with_count(body2, 30), with_count(body3, 10)]
                        );
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_files_not_uploaded",
                    fixtures(),
                    |(s3, _ssm): (S3Env, SsmEnv)| async move {
                        let event = json!({"files": [
                            {"body": sample_body("test", true)},
                            {"count": 20, "body": sample_body("dev", false)},
                            {"body": sample_body("prod", true)},
                        ]});
                        let names = handle(&s3, event).await?;
                        assert!(names.is_empty());
                        assert_eq!(s3.fake.object_count(&s3.bucket).await, 0);
                        Ok::<_, anyhow::Error>(())
                    },
                ))
                .case(TestCase::with_fixture(
                    "test_files_some_not_uploaded",
                    fixtures(),
                    |(s3, _ssm): (S3Env, SsmEnv)| async move {
                        let body = sample_body("dev", false);
                        let event = json!({"files": [
                            {"count": 1, "body": sample_body("test", true)},
                            {"name": "file-2", "body": body},
                            {"body": sample_body("prod", true)},
                        ]});
                        let names = handle(&s3, event).await?;
                        assert_eq!(names, vec!["file-2"]);

                        let stored = stored_bodies(&s3, &["file-2"]).await?;
                        assert_eq!(stored, vec![with_count(body, 10)]);
                        Ok::<_, anyhow::Error>(())
                    },
                )),
        )
}
