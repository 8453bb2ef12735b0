use std::fmt::{Debug, Display};
use std::future::Future;
use tracing::debug;

use crate::HarnessError;

pub fn expect_error<T, E, F>(f: F, expected_message: &str) -> Result<E, HarnessError>
where
    T: Debug,
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    check(f(), expected_message, |actual| actual == expected_message)
}

pub async fn expect_error_async<T, E, Fut>(fut: Fut, expected_message: &str) -> Result<E, HarnessError>
where
    T: Debug,
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    check(fut.await, expected_message, |actual| actual == expected_message)
}

pub fn expect_error_containing<T, E, F>(f: F, fragment: &str) -> Result<E, HarnessError>
where
    T: Debug,
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    check(f(), fragment, |actual| actual.contains(fragment))
}

fn check<T, E>(
    result: Result<T, E>,
    expected: &str,
    matches: impl FnOnce(&str) -> bool,
) -> Result<E, HarnessError>
where
    T: Debug,
    E: Display,
{
    match result {
        Ok(value) => Err(HarnessError::NoErrorRaised {
            expected: expected.to_string(),
            returned: format!("{value:?}"),
        }),
        Err(error) => {
            let actual = error.to_string();
            debug!(result = %actual, expected = %expected, "Captured raised error");
            if matches(&actual) {
                Ok(error)
            } else {
                Err(HarnessError::MessageMismatch {
                    expected: expected.to_string(),
                    actual,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(key: &str) -> Result<u32, String> {
        match key {
            "x" => Err("X not found".to_string()),
            "y" => Err("Y not found".to_string()),
            _ => Ok(7),
        }
    }

    #[test]
    fn captures_matching_error() {
        let err = expect_error(|| find("x"), "X not found").unwrap();
        assert_eq!(err, "X not found");
    }

    #[test]
    fn fails_when_call_returns_normally() {
        let err = expect_error(|| find("z"), "X not found").unwrap_err();
        assert_eq!(
            err,
            HarnessError::NoErrorRaised {
                expected: "X not found".into(),
                returned: "7".into(),
            }
        );
    }

    #[test]
    fn fails_on_different_message() {
        let err = expect_error(|| find("y"), "X not found").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"error message mismatch: expected "X not found", got "Y not found""#
        );
    }

    #[test]
    fn exact_match_rejects_substring() {
        assert!(expect_error(|| find("x"), "not found").is_err());
        assert!(expect_error_containing(|| find("x"), "not found").is_ok());
    }

    #[tokio::test]
    async fn async_variant_awaits_the_call() {
        let err = expect_error_async(async { find("x") }, "X not found").await.unwrap();
        assert_eq!(err, "X not found");

        let missing = expect_error_async(async { find("q") }, "X not found").await;
        assert!(matches!(missing, Err(HarnessError::NoErrorRaised { .. })));
    }
}
