pub mod context_report;
pub mod object_service;
pub mod resource;
pub mod uploader;

pub use context_report::*;
pub use object_service::*;
pub use resource::*;
pub use uploader::*;
