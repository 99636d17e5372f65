use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment keys read on top of the built-in defaults.
const ENV_KEYS: &[&str] = &[
    "front_url",
    "database_url",
    "images_dir",
    "listen_addr",
    "loglevel",
    "max_upload_bytes",
];

/// Runtime configuration, injected into every component at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Single origin allowed by CORS.
    pub front_url: String,
    /// sqlx connection string, e.g. `sqlite:db/items.sqlite3`.
    pub database_url: String,
    /// Directory holding content-addressed images and `default.jpg`.
    pub images_dir: PathBuf,
    pub listen_addr: String,
    pub loglevel: String,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            front_url: "http://localhost:3000".to_string(),
            database_url: "sqlite:db/items.sqlite3".to_string(),
            images_dir: PathBuf::from("images"),
            listen_addr: "0.0.0.0:9000".to_string(),
            loglevel: "info".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults overlaid with `FRONT_URL`, `DATABASE_URL`, `IMAGES_DIR`,
    /// `LISTEN_ADDR`, `LOGLEVEL` and `MAX_UPLOAD_BYTES`.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::raw().only(ENV_KEYS))
    }
}
