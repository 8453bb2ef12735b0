pub mod catch_errors;
pub mod context;
pub mod harness;
pub mod uploader;

use lambda_harness::Suite;

pub fn all() -> Vec<Suite> {
    vec![
        uploader::suite(),
        catch_errors::suite(),
        context::suite(),
        harness::suite(),
    ]
}
