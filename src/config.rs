use std::{
    env, fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use model::ModelSpec;
use serde::Deserialize;

use crate::ConfigErr;

/// Names the JSON file the configuration is loaded from.
pub const CONFIG_VAR: &str = "PREDICTION_CONFIG";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 7878;
const DEFAULT_INPUT_TOPIC: &str = "prediction-input";
const DEFAULT_OUTPUT_TOPIC: &str = "prediction-output";
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Everything the service needs to run, every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub input_topic: String,
    pub output_topic: String,
    /// Messages buffered per topic for its slowest subscriber.
    pub channel_capacity: NonZeroUsize,
    /// Handler invocations kept in flight at once.
    pub concurrency: NonZeroUsize,
    pub models: Vec<ModelSpec>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            input_topic: DEFAULT_INPUT_TOPIC.to_string(),
            output_topic: DEFAULT_OUTPUT_TOPIC.to_string(),
            channel_capacity: NonZeroUsize::new(DEFAULT_CHANNEL_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            concurrency: NonZeroUsize::MIN,
            models: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Loads a configuration from the JSON file at `path`.
    ///
    /// # Errors
    /// Returns a `ConfigErr` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigErr> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|source| ConfigErr::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigErr::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the configuration named by `PREDICTION_CONFIG`, if any, then applies
    /// the `HOST` and `PORT` overrides.
    ///
    /// # Errors
    /// Returns a `ConfigErr` if the file is unusable or `PORT` isn't a port number.
    pub fn from_env() -> Result<Self, ConfigErr> {
        Self::from_vars(|var| env::var(var).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigErr> {
        let mut config = match lookup(CONFIG_VAR) {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Self::default(),
        };

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| ConfigErr::InvalidEnv {
                var: "PORT",
                value: port,
            })?;
        }

        Ok(config)
    }

    /// The address the gateway binds to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
