pub mod object_store;
pub mod parameter_store;

pub use lambda_models::ServiceError;
pub use object_store::*;
pub use parameter_store::*;
