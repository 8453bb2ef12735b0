pub mod config;
pub mod fakes;
pub mod fixtures;
pub mod helpers;
pub mod mocks;

pub use config::*;
pub use fakes::*;
pub use fixtures::*;
pub use helpers::*;
pub use mocks::*;
