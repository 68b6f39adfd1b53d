use super::BrokerConfig;
use crate::{KraftmqError, Result};
use config::{Config, Environment};

pub const ENV_PREFIX: &str = "KRAFTMQ";

impl BrokerConfig {
    /// Build a config from `KRAFTMQ_*` environment variables
    /// (e.g. `KRAFTMQ_PORT`, `KRAFTMQ_LOG_DIR`). Unset fields keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .add_source(environment.try_parsing(true))
            .build()
            .map_err(|e| KraftmqError::Config(e.to_string()))?;

        let config = settings
            .try_deserialize::<BrokerConfig>()
            .map_err(|e| KraftmqError::Config(e.to_string()))?;

        config.validate().map_err(KraftmqError::Config)?;
        Ok(config)
    }
}
