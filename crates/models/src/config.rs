use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::{Uncased, UncasedStr};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::LambdaError;

pub const DEFAULT_REGION: &str = "us-east-1";

pub const ENV_BUCKET_KEY: &str = "S3_BUCKET";
pub const ENV_ACCESS_KEY: &str = "S3_ACCESS_PARAM";
pub const ENV_SECRET_KEY: &str = "S3_SECRET_PARAM";
pub const ENV_REGION_KEY: &str = "AWS_DEFAULT_REGION";

// Environment variable -> config field
const ENV_FIELDS: [(&str, &str); 4] = [
    (ENV_BUCKET_KEY, "bucket"),
    (ENV_ACCESS_KEY, "access_param"),
    (ENV_SECRET_KEY, "secret_param"),
    (ENV_REGION_KEY, "region"),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FunctionConfig {
    pub bucket: String,
    pub access_param: String,
    pub secret_param: String,
    pub region: String,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            access_param: String::new(),
            secret_param: String::new(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl FunctionConfig {
    pub fn new(bucket: &str, access_param: &str, secret_param: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            access_param: access_param.to_string(),
            secret_param: secret_param.to_string(),
            ..Self::default()
        }
    }

    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(FunctionConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(
            Env::raw()
                .only(&ENV_FIELDS.map(|(env, _)| env))
                .map(env_field),
        )
    }

    pub fn load(path: Option<&Path>) -> Result<Self, LambdaError> {
        let config: FunctionConfig = Self::figment(path)
            .extract()
            .map_err(|e| LambdaError::ConfigError { reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, LambdaError> {
        Self::load(None)
    }

    pub fn validate(&self) -> Result<(), LambdaError> {
        let required = [
            (ENV_BUCKET_KEY, &self.bucket),
            (ENV_ACCESS_KEY, &self.access_param),
            (ENV_SECRET_KEY, &self.secret_param),
            (ENV_REGION_KEY, &self.region),
        ];
        for (env, value) in required {
            if value.trim().is_empty() {
                return Err(LambdaError::ConfigError {
                    reason: format!("{env} is not set"),
                });
            }
        }
        Ok(())
    }
}

fn env_field(key: &UncasedStr) -> Uncased<'_> {
    ENV_FIELDS
        .iter()
        .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
        .map(|(_, field)| Uncased::from(*field))
        .unwrap_or_else(|| key.as_str().into())
}
