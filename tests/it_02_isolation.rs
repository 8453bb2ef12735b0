use async_trait::async_trait;
use lambda_clients::ServiceError;
use lambda_functions::ResourceLoader;
use lambda_harness::{
    expect_error, override_environment, substitute_call, Behavior, Fixture, Group, Runner, Selection, Slot, Suite,
    TestCase,
};
use lambda_testsupport::{MockObjectStore, S3Fixture};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn run_quietly(suite: Suite) -> (lambda_harness::RunSummary, String) {
    let mut out = Vec::new();
    let summary = Runner::new(false)
        .run(&[suite], &Selection::all(), &mut out)
        .expect("runner failed");
    (summary, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn environment_override_is_gone_after_failing_case() {
    const KEY: &str = "LAMBDA_TESTKIT_IT_FAILING_OVERRIDE";
    let suite = Suite::new("isolation").group(Group::new("Env").case(TestCase::new("test_fails_with_override", || async {
        let _env = override_environment(KEY, "during");
        Err::<(), _>(anyhow::anyhow!("deliberate failure"))
    })));

    let (summary, out) = run_quietly(suite);
    assert_eq!(summary.failed(), 1);
    assert!(out.contains("deliberate failure"));
    assert!(std::env::var(KEY).is_err());
}

#[test]
fn environment_override_restores_previous_value() {
    const KEY: &str = "LAMBDA_TESTKIT_IT_PREVIOUS";
    {
        let _outer = override_environment(KEY, "before");
        {
            let _inner = override_environment(KEY, "during");
            assert_eq!(std::env::var(KEY).as_deref(), Ok("during"));
        }
        assert_eq!(std::env::var(KEY).as_deref(), Ok("before"));
    }
    assert!(std::env::var(KEY).is_err());
}

#[test]
fn substitution_is_reverted_after_panicking_case() {
    let store = Arc::new(MockObjectStore::in_memory());
    let shared = store.clone();
    let suite = Suite::new("isolation").group(Group::new("Substitution").case(TestCase::new(
        "test_panics_while_substituted",
        move || {
            let store = shared.clone();
            async move {
                let _guard = substitute_call(&store.get_object, Behavior::returns(None));
                assert!(!store.get_object.is_substituted(), "deliberate panic");
                Ok::<_, anyhow::Error>(())
            }
        },
    )));

    let (summary, out) = run_quietly(suite);
    assert_eq!(summary.failed(), 1);
    assert!(out.contains("deliberate panic"));
    assert!(!store.get_object.is_substituted());
}

#[test]
fn reverted_operation_behaves_as_before() {
    let slot: Slot<String, String, ServiceError> = Slot::new("fetch");
    let real = |slot: &Slot<String, String, ServiceError>, key: &str| {
        slot.intercept(&key.to_string()).unwrap_or_else(|| Ok(format!("real:{key}")))
    };

    let before = real(&slot, "k");
    let guard = substitute_call(&slot, Behavior::raises(ServiceError::raised("Resource unavailable")));
    assert!(real(&slot, "k").is_err());
    guard.revert();
    assert_eq!(real(&slot, "k"), before);
}

#[test]
fn expect_error_requires_exact_message() {
    let not_found = || -> Result<(), ServiceError> { Err(ServiceError::ParameterNotFound { name: "X".into() }) };

    assert!(expect_error(not_found, "Parameter X not found").is_ok());
    assert!(expect_error(not_found, "Parameter X not").is_err());
    assert!(expect_error(|| Ok::<_, ServiceError>(()), "Parameter X not found").is_err());
}

#[tokio::test]
async fn resource_loader_properties() -> anyhow::Result<()> {
    let store = Arc::new(MockObjectStore::in_memory());
    let loader = ResourceLoader::new(store.clone(), "test-bucket");
    {
        let _guard = substitute_call(&store.get_object, Behavior::returns(None));
        assert_eq!(loader.load("missing.txt").await?, "default content");
    }
    {
        let _guard = substitute_call(
            &store.get_object,
            Behavior::raises(ServiceError::raised("Resource unavailable")),
        );
        let err = lambda_harness::expect_error_async(loader.load("missing.txt"), "Resource unavailable").await?;
        assert_eq!(err.to_string(), "Resource unavailable");
    }
    Ok(())
}

struct Tracked {
    log: Rc<RefCell<Vec<&'static str>>>,
}

#[async_trait(?Send)]
impl Fixture for Tracked {
    type Value = ();

    async fn setup(&self) -> anyhow::Result<()> {
        self.log.borrow_mut().push("setup");
        Ok(())
    }

    async fn teardown(&self, _value: ()) -> anyhow::Result<()> {
        self.log.borrow_mut().push("teardown");
        Ok(())
    }
}

#[test]
fn teardown_runs_after_failed_execution() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let body_log = log.clone();
    let suite = Suite::new("isolation").group(Group::new("Phases").case(TestCase::with_fixture(
        "test_fails",
        Tracked { log: log.clone() },
        move |()| {
            let log = body_log.clone();
            async move {
                log.borrow_mut().push("execution");
                Err::<(), _>(anyhow::anyhow!("boom"))
            }
        },
    )));

    let (summary, _) = run_quietly(suite);
    assert_eq!(summary.failed(), 1);
    assert_eq!(*log.borrow(), vec!["setup", "execution", "teardown"]);
}

#[test]
fn fixtures_are_fresh_per_case() {
    let suite = Suite::new("isolation").group(
        Group::new("Fresh")
            .case(TestCase::with_fixture("test_first", S3Fixture::default(), |s3| async move {
                let _guard = substitute_call(&s3.store.put_object, Behavior::raises(ServiceError::raised("nope")));
                Ok::<_, anyhow::Error>(())
            }))
            .case(TestCase::with_fixture("test_second", S3Fixture::default(), |s3| async move {
                anyhow::ensure!(!s3.store.put_object.is_substituted(), "substitution leaked");
                anyhow::ensure!(s3.fake.object_count(&s3.bucket).await == 0, "objects leaked");
                Ok::<_, anyhow::Error>(())
            })),
    );

    let (summary, out) = run_quietly(suite);
    assert!(summary.success(), "{out}");
}
