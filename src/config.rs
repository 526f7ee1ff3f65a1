use anyhow::{Context, Error};
use ::config::{Config, Environment, File};

#[derive(Debug, Clone, serde_derive::Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub listen_address: String,
    pub marathon: MarathonConfig,
    pub microbadger: MicrobadgerConfig,
    pub port_exposure: PortExposureConfig,
}

#[derive(Debug, Clone, serde_derive::Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MarathonConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Marathon group every deployment is placed under.
    pub group: String,
}

#[derive(Debug, Clone, serde_derive::Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MicrobadgerConfig {
    pub url: String,
    pub timeout_secs: u64,
}

/// Applications whose name ends with one of `suffixes` must expose ports,
/// the others must not. An empty list disables the rule.
#[derive(Debug, Clone, Default, serde_derive::Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortExposureConfig {
    pub suffixes: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8000".to_string(),
            marathon: MarathonConfig::default(),
            microbadger: MicrobadgerConfig::default(),
            port_exposure: PortExposureConfig::default(),
        }
    }
}

impl Default for MarathonConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            group: "maracker".to_string(),
        }
    }
}

impl Default for MicrobadgerConfig {
    fn default() -> Self {
        Self {
            url: "https://api.microbadger.com".to_string(),
            timeout_secs: 10,
        }
    }
}

pub fn load_config() -> Result<AppConfig, Error> {
    let config = Config::builder()
        .add_source(File::with_name("maracker").required(false))
        .add_source(
            Environment::with_prefix("maracker")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("port_exposure.suffixes")
                .try_parsing(true),
        )
        .build()
        .context("Can't load configuration")?;

    config
        .try_deserialize()
        .context("Can't deserialize AppConfig from loaded configuration")
}
