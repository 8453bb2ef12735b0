use lambda_models::FunctionConfig;

use crate::fixtures::{ACCESS_KEY_PARAM, SECRET_KEY_PARAM, TEST_BUCKET};

pub fn test_config() -> FunctionConfig {
    FunctionConfig::new(TEST_BUCKET, ACCESS_KEY_PARAM, SECRET_KEY_PARAM)
}

#[derive(Debug, Default, Clone)]
pub struct ConfigOverride {
    pub bucket: Option<String>,
    pub access_param: Option<String>,
    pub secret_param: Option<String>,
    pub region: Option<String>,
}

impl ConfigOverride {
    pub fn apply(self, mut config: FunctionConfig) -> FunctionConfig {
        if let Some(bucket) = self.bucket {
            config.bucket = bucket;
        }
        if let Some(access_param) = self.access_param {
            config.access_param = access_param;
        }
        if let Some(secret_param) = self.secret_param {
            config.secret_param = secret_param;
        }
        if let Some(region) = self.region {
            config.region = region;
        }
        config
    }

    pub fn build(self) -> FunctionConfig {
        self.apply(test_config())
    }
}
