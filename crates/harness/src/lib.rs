//! Mock harness for unit-testing functions that call cloud services.

pub mod capture;
pub mod context;
pub mod env;
pub mod error;
pub mod expect;
pub mod fixture;
pub mod runner;
pub mod substitute;

pub use capture::*;
pub use context::*;
pub use env::*;
pub use error::*;
pub use expect::*;
pub use fixture::*;
pub use runner::*;
pub use substitute::*;
