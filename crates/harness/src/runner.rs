use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{info, Level};

use crate::capture::CaptureBuffer;
use crate::fixture::{run_phases, Failure, Fixture, NoFixture, Phases};

pub const TEST_PREFIX: &str = "test_";

const NODE_SEPARATOR: &str = "::";

pub struct TestCase {
    name: String,
    run: Box<dyn Fn() -> LocalBoxFuture<'static, Phases>>,
}

impl TestCase {
    pub fn new<B, Fut>(name: &str, body: B) -> Self
    where
        B: Fn() -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        Self::with_fixture(name, NoFixture, move |()| body())
    }

    pub fn with_fixture<F, B, Fut>(name: &str, fixture: F, body: B) -> Self
    where
        F: Fixture + 'static,
        F::Value: Clone + 'static,
        B: Fn(F::Value) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        let fixture = Rc::new(fixture);
        let body = Rc::new(body);
        let run = move || {
            let fixture = fixture.clone();
            let body = body.clone();
            async move { run_phases(fixture.as_ref(), body.as_ref()).await }.boxed_local()
        };
        Self {
            name: name.to_string(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct Group {
    name: String,
    cases: Vec<TestCase>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases: Vec::new(),
        }
    }

    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }
}

pub struct Suite {
    name: String,
    groups: Vec<Group>,
}

impl Suite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            groups: Vec::new(),
        }
    }

    pub fn group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collect<'a>(&'a self, selection: &Selection) -> Vec<(String, &'a TestCase)> {
        self.groups
            .iter()
            .flat_map(|group| {
                group.cases.iter().map(move |case| {
                    let node = format!("{}{NODE_SEPARATOR}{}{NODE_SEPARATOR}{}", self.name, group.name, case.name);
                    (node, case)
                })
            })
            .filter(|(node, case)| case.name.starts_with(TEST_PREFIX) && selection.matches(node))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub path: Option<String>,
    pub filter: Option<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, node: &str) -> bool {
        let in_path = match self.path.as_deref() {
            None => true,
            Some(path) => {
                node == path
                    || node
                        .strip_prefix(path)
                        .is_some_and(|rest| rest.starts_with(NODE_SEPARATOR))
            }
        };
        let in_filter = match self.filter.as_deref() {
            None => true,
            Some(filter) => node.to_lowercase().contains(&filter.to_lowercase()),
        };
        in_path && in_filter
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed { message: String },
    SetupError { message: String },
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub node: String,
    pub outcome: Outcome,
    pub teardown_error: Option<String>,
    pub captured: String,
    pub duration: Duration,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed && self.teardown_error.is_none()
    }

    pub fn status(&self) -> &'static str {
        match (&self.outcome, &self.teardown_error) {
            (Outcome::Passed, None) => "PASSED",
            (Outcome::Failed { .. }, _) => "FAILED",
            _ => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<CaseReport>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.status() == "PASSED").count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.status() == "FAILED").count()
    }

    pub fn errors(&self) -> usize {
        self.reports.iter().filter(|r| r.status() == "ERROR").count()
    }

    pub fn success(&self) -> bool {
        self.reports.iter().all(CaseReport::passed)
    }
}

#[derive(Debug, Clone)]
pub struct Runner {
    pub verbose: bool,
    pub log_level: Level,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            verbose: false,
            log_level: Level::DEBUG,
        }
    }
}

impl Runner {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    pub fn run(
        &self,
        suites: &[Suite],
        selection: &Selection,
        out: &mut dyn Write,
    ) -> anyhow::Result<RunSummary> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let started = Instant::now();
        let cases: Vec<_> = suites.iter().flat_map(|s| s.collect(selection)).collect();
        info!(cases = cases.len(), "Collected test cases");
        writeln!(out, "collected {} items", cases.len())?;

        let mut summary = RunSummary::default();
        for (node, case) in cases {
            let report = self.run_case(&rt, node, case);
            writeln!(out, "{} {}", report.node, report.status())?;
            if self.verbose || !report.passed() {
                self.write_details(&report, out)?;
            }
            summary.reports.push(report);
        }
        summary.duration = started.elapsed();

        writeln!(
            out,
            "{} passed, {} failed, {} errors in {:.2}s",
            summary.passed(),
            summary.failed(),
            summary.errors(),
            summary.duration.as_secs_f64()
        )?;
        Ok(summary)
    }

    fn run_case(&self, rt: &tokio::runtime::Runtime, node: String, case: &TestCase) -> CaseReport {
        let capture = CaptureBuffer::new();
        let started = Instant::now();
        let phases = tracing::subscriber::with_default(capture.subscriber(self.log_level), || {
            rt.block_on((case.run)())
        });

        let outcome = match (phases.setup, phases.execution) {
            (Err(failure), _) => Outcome::SetupError {
                message: failure.message(),
            },
            (Ok(()), Some(Err(failure))) => Outcome::Failed {
                message: failure.message(),
            },
            (Ok(()), _) => Outcome::Passed,
        };
        let teardown_error = phases
            .teardown
            .and_then(|t| t.err())
            .map(|f: Failure| f.message());

        CaseReport {
            node,
            outcome,
            teardown_error,
            captured: capture.contents(),
            duration: started.elapsed(),
        }
    }

    fn write_details(&self, report: &CaseReport, out: &mut dyn Write) -> std::io::Result<()> {
        match &report.outcome {
            Outcome::Passed => {}
            Outcome::Failed { message } => writeln!(out, "  execution: {message}")?,
            Outcome::SetupError { message } => writeln!(out, "  setup: {message}")?,
        }
        if let Some(message) = &report.teardown_error {
            writeln!(out, "  teardown: {message}")?;
        }
        if !report.captured.is_empty() {
            writeln!(out, "  ----- captured log -----")?;
            for line in report.captured.lines() {
                writeln!(out, "  {line}")?;
            }
        }
        Ok(())
    }
}
