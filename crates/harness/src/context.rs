use lambda_models::InvocationContext;
use uuid::Uuid;

use crate::HarnessError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubContext {
    invoked_function_arn: String,
    log_stream_name: String,
    log_group_name: String,
    aws_request_id: String,
    memory_limit_in_mb: u64,
    remaining_time_in_millis: u64,
}

impl StubContext {
    pub fn builder() -> StubContextBuilder {
        StubContextBuilder::default()
    }

    pub fn sample() -> Self {
        Self {
            invoked_function_arn: "arn:aws:lambda:us-east-1:123456789012:function:context".into(),
            log_stream_name: "2024/01/01/[$LATEST]0123456789abcdef".into(),
            log_group_name: "/aws/lambda/context".into(),
            aws_request_id: Uuid::new_v4().to_string(),
            memory_limit_in_mb: 128,
            remaining_time_in_millis: 3000,
        }
    }
}

impl InvocationContext for StubContext {
    fn invoked_function_arn(&self) -> &str {
        &self.invoked_function_arn
    }

    fn log_stream_name(&self) -> &str {
        &self.log_stream_name
    }

    fn log_group_name(&self) -> &str {
        &self.log_group_name
    }

    fn aws_request_id(&self) -> &str {
        &self.aws_request_id
    }

    fn memory_limit_in_mb(&self) -> u64 {
        self.memory_limit_in_mb
    }

    fn remaining_time_in_millis(&self) -> u64 {
        self.remaining_time_in_millis
    }
}

#[derive(Debug, Clone, Default)]
pub struct StubContextBuilder {
    invoked_function_arn: Option<String>,
    log_stream_name: Option<String>,
    log_group_name: Option<String>,
    aws_request_id: Option<String>,
    memory_limit_in_mb: Option<u64>,
    remaining_time_in_millis: Option<u64>,
}

impl StubContextBuilder {
    pub fn invoked_function_arn(mut self, arn: &str) -> Self {
        self.invoked_function_arn = Some(arn.to_string());
        self
    }

    pub fn log_stream_name(mut self, name: &str) -> Self {
        self.log_stream_name = Some(name.to_string());
        self
    }

    pub fn log_group_name(mut self, name: &str) -> Self {
        self.log_group_name = Some(name.to_string());
        self
    }

    pub fn aws_request_id(mut self, id: &str) -> Self {
        self.aws_request_id = Some(id.to_string());
        self
    }

    pub fn memory_limit_in_mb(mut self, mb: u64) -> Self {
        self.memory_limit_in_mb = Some(mb);
        self
    }

    pub fn remaining_time_in_millis(mut self, ms: u64) -> Self {
        self.remaining_time_in_millis = Some(ms);
        self
    }

    pub fn build(self) -> Result<StubContext, HarnessError> {
        fn required<T>(value: Option<T>, attribute: &'static str) -> Result<T, HarnessError> {
            value.ok_or(HarnessError::MissingAttribute { attribute })
        }

        Ok(StubContext {
            invoked_function_arn: required(self.invoked_function_arn, "invoked_function_arn")?,
            log_stream_name: required(self.log_stream_name, "log_stream_name")?,
            log_group_name: required(self.log_group_name, "log_group_name")?,
            aws_request_id: required(self.aws_request_id, "aws_request_id")?,
            memory_limit_in_mb: required(self.memory_limit_in_mb, "memory_limit_in_mb")?,
            remaining_time_in_millis: required(self.remaining_time_in_millis, "remaining_time_in_millis")?,
        })
    }
}
