use figment::providers::{Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: API endpoint, navigation routes, credential
/// store backend and logging.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    pub api: ApiConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Where the backing API lives and how the refresh exchange is reached.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_timeout_in_ms() -> u64 {
    3000
}

/// Navigation targets for the re-authentication side effects. Redirects to
/// `login` are suppressed while the current view is already under
/// `auth_prefix`.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct RouteConfig {
    pub login: String,
    pub verify_account: String,
    pub auth_prefix: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        RouteConfig {
            login: "/auth/login".to_string(),
            verify_account: "/auth/verify-account".to_string(),
            auth_prefix: "/auth".to_string(),
        }
    }
}

/// Load config from a YAML file named "config.yaml" in the current directory.
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new().merge(Yaml::file("./config.yaml"));
    let config = match figment.extract::<Config>() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    match config {
        Config::ConfigV1(c) => c,
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
