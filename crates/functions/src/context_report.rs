use lambda_models::{ContextReport, InvocationContext, LambdaError};
use serde_json::Value;
use tracing::info;

pub fn report(context: &dyn InvocationContext) -> ContextReport {
    let report = ContextReport {
        invoked_function_arn: context.invoked_function_arn().to_string(),
        log_stream_name: context.log_stream_name().to_string(),
        log_group_name: context.log_group_name().to_string(),
        aws_request_id: context.aws_request_id().to_string(),
        memory_limit_in_mb: context.memory_limit_in_mb(),
        remaining_time_in_millis: context.remaining_time_in_millis(),
    };

    info!(invoked_function_arn = %report.invoked_function_arn, "Lambda function ARN");
    info!(log_stream_name = %report.log_stream_name, "CloudWatch log stream name");
    info!(log_group_name = %report.log_group_name, "CloudWatch log group name");
    info!(aws_request_id = %report.aws_request_id, "Lambda Request ID");
    info!(memory_limit_in_mb = report.memory_limit_in_mb, "Lambda function memory limits in MB");
    info!(remaining_time_in_millis = report.remaining_time_in_millis, "Lambda time remaining in MS");
    report
}

pub fn handler(_event: &Value, context: &dyn InvocationContext) -> Result<Value, LambdaError> {
    Ok(serde_json::to_value(report(context))?)
}
