use clap::{Parser, Subcommand};
use figment::providers::{Env, Serialized};
use figment::Figment;
use lambda_harness::{Runner, Selection};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

use crate::suites;

#[derive(Parser, Debug)]
#[command(name = "lambda-testkit")]
#[command(about = "Run Lambda unit-test suites against mocked AWS clients")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List the cases that would run
    List {
        /// Node path: suite, suite::group or suite::group::case
        path: Option<String>,
        /// Only cases whose id contains this (case-insensitive)
        #[arg(short = 'k', long)]
        filter: Option<String>,
    },
    /// Run cases and report the outcome of each
    Run {
        /// Node path: suite, suite::group or suite::group::case
        path: Option<String>,
        /// Only cases whose id contains this (case-insensitive)
        #[arg(short = 'k', long)]
        filter: Option<String>,
        /// Print captured logs for passing cases too
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    pub verbose: bool,
    pub filter: Option<String>,
}

impl RunnerConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(RunnerConfig::default()))
            .merge(Env::prefixed("LAMBDA_TESTKIT_"))
    }

    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::figment().extract()?)
    }
}

pub fn execute(cli: Cli, config: RunnerConfig, out: &mut dyn Write) -> anyhow::Result<bool> {
    let all = suites::all();
    match cli.command {
        Commands::List { path, filter } => {
            let selection = Selection {
                path,
                filter: filter.or(config.filter),
            };
            for suite in &all {
                for (node, _) in suite.collect(&selection) {
                    writeln!(out, "{node}")?;
                }
            }
            Ok(true)
        }
        Commands::Run { path, filter, verbose } => {
            let selection = Selection {
                path,
                filter: filter.or(config.filter),
            };
            info!(?selection, "Running suites");
            let summary = Runner::new(verbose || config.verbose).run(&all, &selection, out)?;
            Ok(summary.success())
        }
    }
}
