use lambda_functions::context_report::handler;
use lambda_harness::{expect_error_containing, Group, Suite, TestCase, StubContext};
use lambda_models::ContextReport;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

pub fn suite() -> Suite {
    Suite::new("context").group(
        Group::new("TestLambdaHandler")
            .case(TestCase::new("test_lambda_handler_context_error", || async {
                // A context with nothing set cannot be handed to a function.
                let err = expect_error_containing(|| StubContext::builder().build(), "has no attribute")?;
                debug!(error = %err, "Unmocked context");
                Ok::<_, anyhow::Error>(())
            }))
            .case(TestCase::new("test_invoked_function_arn", || async {
                let request_id = Uuid::new_v4().to_string();
                let context = StubContext::builder()
                    .invoked_function_arn("arn:aws:lambda:us-east-1:accountid:function:context")
                    .log_stream_name("date[$LATEST]id")
                    .log_group_name("/aws/lambda/context")
                    .aws_request_id(&request_id)
                    .memory_limit_in_mb(128)
                    .remaining_time_in_millis(2999)
                    .build()?;

                let result: ContextReport = serde_json::from_value(handler(&json!({}), &context)?)?;
                let expected = ContextReport {
                    invoked_function_arn: "arn:aws:lambda:us-east-1:accountid:function:context".into(),
                    log_stream_name: "date[$LATEST]id".into(),
                    log_group_name: "/aws/lambda/context".into(),
                    aws_request_id: request_id,
                    memory_limit_in_mb: 128,
                    remaining_time_in_millis: 2999,
                };
                debug!(?result, ?expected, "Comparing context report");
                assert_eq!(result, expected);
                Ok::<_, anyhow::Error>(())
            }))
            .case(TestCase::new("test_remaining_time", || async {
                let context = StubContext::builder()
                    .invoked_function_arn("arn:aws:lambda:us-east-1:accountid:function:context")
                    .log_stream_name("date[$LATEST]id")
                    .log_group_name("/aws/lambda/context")
                    .aws_request_id("request")
                    .memory_limit_in_mb(128)
                    .remaining_time_in_millis(5000)
                    .build()?;

                let result = handler(&json!({}), &context)?;
                assert_eq!(result["remaining_time_in_millis"], 5000);
                Ok::<_, anyhow::Error>(())
            })),
    )
}
