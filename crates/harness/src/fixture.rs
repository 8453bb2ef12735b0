use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::HarnessError;

#[async_trait(?Send)]
pub trait Fixture {
    type Value;

    async fn setup(&self) -> anyhow::Result<Self::Value>;

    async fn teardown(&self, value: Self::Value) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoFixture;

#[async_trait(?Send)]
impl Fixture for NoFixture {
    type Value = ();

    async fn setup(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn teardown(&self, _value: ()) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait(?Send)]
impl<A, B> Fixture for (A, B)
where
    A: Fixture,
    B: Fixture,
{
    type Value = (A::Value, B::Value);

    async fn setup(&self) -> anyhow::Result<Self::Value> {
        let a = self.0.setup().await?;
        match self.1.setup().await {
            Ok(b) => Ok((a, b)),
            Err(e) => {
                if let Err(teardown) = self.0.teardown(a).await {
                    warn!(error = %teardown, "Teardown after failed setup also failed");
                }
                Err(e)
            }
        }
    }

    async fn teardown(&self, value: Self::Value) -> anyhow::Result<()> {
        let (a, b) = value;
        let second = self.1.teardown(b).await;
        let first = self.0.teardown(a).await;
        second.and(first)
    }
}

pub enum Failure {
    Error(anyhow::Error),
    Panic(Box<dyn Any + Send>),
}

impl Failure {
    pub fn message(&self) -> String {
        match self {
            Failure::Error(e) => format!("{e:?}"),
            Failure::Panic(payload) => panic_message(payload.as_ref()),
        }
    }
}

/// `execution` and `teardown` are `None` when setup failed.
pub struct Phases {
    pub setup: Result<(), Failure>,
    pub execution: Option<Result<(), Failure>>,
    pub teardown: Option<Result<(), Failure>>,
}

pub async fn run_phases<F, B, Fut>(fixture: &F, body: &B) -> Phases
where
    F: Fixture,
    F::Value: Clone,
    B: Fn(F::Value) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    debug!("Setup");
    let value = match catch(fixture.setup()).await {
        Ok(value) => value,
        Err(failure) => {
            return Phases {
                setup: Err(failure),
                execution: None,
                teardown: None,
            }
        }
    };

    debug!("Execution");
    let execution = catch(body(value.clone())).await;

    debug!("Teardown");
    let teardown = catch(fixture.teardown(value)).await;

    Phases {
        setup: Ok(()),
        execution: Some(execution),
        teardown: Some(teardown),
    }
}

/// Runs `body` with a value from `fixture`, then tears the fixture down.
///
/// A panic in `body` resumes after teardown, so `assert!` failures still
/// fail the surrounding test with their original message. An execution
/// error wins over a teardown error; the latter is logged.
pub async fn with_fixture<F, B, Fut>(fixture: &F, body: B) -> anyhow::Result<()>
where
    F: Fixture,
    F::Value: Clone,
    B: Fn(F::Value) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let phases = run_phases(fixture, &body).await;

    if let Err(failure) = phases.setup {
        return match failure {
            Failure::Panic(payload) => panic::resume_unwind(payload),
            Failure::Error(e) => Err(HarnessError::Setup { reason: format!("{e:#}") }.into()),
        };
    }

    let teardown = match phases.teardown {
        Some(Err(failure)) => Some(HarnessError::Teardown {
            reason: failure.message(),
        }),
        _ => None,
    };

    match phases.execution {
        Some(Err(Failure::Panic(payload))) => {
            if let Some(teardown) = &teardown {
                warn!(error = %teardown, "Teardown failed after execution panicked");
            }
            panic::resume_unwind(payload)
        }
        Some(Err(Failure::Error(e))) => {
            if let Some(teardown) = &teardown {
                warn!(error = %teardown, "Teardown failed after execution error");
            }
            Err(e)
        }
        _ => match teardown {
            Some(teardown) => Err(teardown.into()),
            None => Ok(()),
        },
    }
}

async fn catch<T>(fut: impl Future<Output = anyhow::Result<T>>) -> Result<T, Failure> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Failure::Error(e)),
        Err(payload) => Err(Failure::Panic(payload)),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked with a non-string payload".to_string()
    }
}
