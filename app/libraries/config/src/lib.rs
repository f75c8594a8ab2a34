use app_log::LogLevel;
use dotenv::dotenv;
use log::*;
use serde::{Deserialize, Serialize};
use std::{env, fs, io::Read};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    /// Postgres reached through `DATABASE_URL`.
    #[default]
    Postgres,
    /// In-process store, optionally seeded from `seed_path`.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_bind: String, // 0.0.0.0:9000
    pub log_level: LogLevel,  // Off, Error, Warn, Info, Debug, Trace
    #[serde(default = "default_pg_connection")]
    pub pg_connection: usize,
    #[serde(default)]
    pub store_backend: StoreBackend,
    #[serde(default)]
    pub seed_path: Option<String>,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    #[serde(default)]
    pub redis_url: Option<String>, // redis://127.0.0.1:6379
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_token: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: i32,
}

fn default_pg_connection() -> usize {
    5
}

fn default_query_timeout_secs() -> u64 {
    5
}

fn default_rate_limit_requests() -> u32 {
    20
}

fn default_rate_limit_window_secs() -> u64 {
    86_400
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_max_tokens() -> i32 {
    1024
}

impl AppConfig {
    pub fn new() -> Self {
        dotenv().ok();
        match env::var("APP_CONFIG") {
            Err(e) => {
                debug!("{}", &e);
                panic!(
                    "Cannot locate config file; please set APP_CONFIG env variable! {}",
                    &e
                );
            }
            Ok(config_file_path) => match fs::File::open(config_file_path) {
                Err(e) => {
                    debug!("{}", &e);
                    panic!("Cannot read config file! {}", &e);
                }
                Ok(config_file) => match Self::from_reader(config_file) {
                    Err(e) => {
                        debug!("{}", &e);
                        panic!("Cannot parse json! {}", &e);
                    }
                    Ok(json) => return json,
                },
            },
        };
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}
