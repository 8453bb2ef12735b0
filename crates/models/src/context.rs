use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const ENV_FUNCTION_MEMORY_SIZE: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";
pub const ENV_LOG_GROUP_NAME: &str = "AWS_LAMBDA_LOG_GROUP_NAME";
pub const ENV_LOG_STREAM_NAME: &str = "AWS_LAMBDA_LOG_STREAM_NAME";

const DEFAULT_MEMORY_MB: u64 = 128;

pub trait InvocationContext: Send + Sync {
    fn invoked_function_arn(&self) -> &str;
    fn log_stream_name(&self) -> &str;
    fn log_group_name(&self) -> &str;
    fn aws_request_id(&self) -> &str;
    fn memory_limit_in_mb(&self) -> u64;
    fn remaining_time_in_millis(&self) -> u64;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeInvocation {
    pub aws_request_id: Uuid,
    pub deadline_ms: i64,
    pub invoked_function_arn: String,
    pub trace_id: Option<String>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct LambdaContext {
    pub invoked_function_arn: String,
    pub log_stream_name: String,
    pub log_group_name: String,
    pub aws_request_id: String,
    pub memory_limit_in_mb: u64,
    pub deadline_ms: i64,
}

impl LambdaContext {
    pub fn from_invocation(invocation: &RuntimeInvocation, env: &HashMap<String, String>) -> Self {
        let memory_limit_in_mb = env
            .get(ENV_FUNCTION_MEMORY_SIZE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MEMORY_MB);

        Self {
            invoked_function_arn: invocation.invoked_function_arn.clone(),
            log_stream_name: env.get(ENV_LOG_STREAM_NAME).cloned().unwrap_or_default(),
            log_group_name: env.get(ENV_LOG_GROUP_NAME).cloned().unwrap_or_default(),
            aws_request_id: invocation.aws_request_id.to_string(),
            memory_limit_in_mb,
            deadline_ms: invocation.deadline_ms,
        }
    }

    fn remaining_at(&self, now_ms: i64) -> u64 {
        // Past the deadline reports zero rather than wrapping
        self.deadline_ms.saturating_sub(now_ms).max(0) as u64
    }
}

impl InvocationContext for LambdaContext {
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
        self.remaining_at(Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(deadline_ms: i64) -> RuntimeInvocation {
        RuntimeInvocation {
            aws_request_id: Uuid::new_v4(),
            deadline_ms,
            invoked_function_arn: "arn:aws:lambda:us-east-1:123456789012:function:context".into(),
            trace_id: None,
            payload: serde_json::json!({}),
        }
    }

    #[test]
    fn reads_names_and_memory_from_environment() {
        let env: HashMap<String, String> = [
            (ENV_FUNCTION_MEMORY_SIZE.to_string(), "256".to_string()),
            (ENV_LOG_GROUP_NAME.to_string(), "/aws/lambda/context".to_string()),
            (ENV_LOG_STREAM_NAME.to_string(), "2024/01/01/[$LATEST]abc".to_string()),
        ]
        .into_iter()
        .collect();
        let inv = invocation(0);

        let ctx = LambdaContext::from_invocation(&inv, &env);
        assert_eq!(ctx.memory_limit_in_mb(), 256);
        assert_eq!(ctx.log_group_name(), "/aws/lambda/context");
        assert_eq!(ctx.log_stream_name(), "2024/01/01/[$LATEST]abc");
        assert_eq!(ctx.aws_request_id(), inv.aws_request_id.to_string());
    }

    #[test]
    fn memory_defaults_when_unset_or_invalid() {
        let mut env = HashMap::new();
        let ctx = LambdaContext::from_invocation(&invocation(0), &env);
        assert_eq!(ctx.memory_limit_in_mb(), 128);

        env.insert(ENV_FUNCTION_MEMORY_SIZE.to_string(), "lots".to_string());
        let ctx = LambdaContext::from_invocation(&invocation(0), &env);
        assert_eq!(ctx.memory_limit_in_mb(), 128);
    }

    #[test]
    fn remaining_time_counts_down_to_deadline() {
        let ctx = LambdaContext::from_invocation(&invocation(10_000), &HashMap::new());
        assert_eq!(ctx.remaining_at(7_000), 3_000);
        assert_eq!(ctx.remaining_at(10_000), 0);
    }

    #[test]
    fn remaining_time_saturates_after_deadline() {
        let ctx = LambdaContext::from_invocation(&invocation(1_000), &HashMap::new());
        assert_eq!(ctx.remaining_at(5_000), 0);
        assert_eq!(ctx.remaining_time_in_millis(), 0);
    }
}
