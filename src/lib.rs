pub mod cli;
pub mod suites;

pub use lambda_clients as clients;
pub use lambda_functions as functions;
pub use lambda_harness as harness;
pub use lambda_models as models;
pub use lambda_testsupport as testsupport;

pub use cli::{execute, Cli, Commands, RunnerConfig};
