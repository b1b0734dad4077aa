use crate::capture::DuplicatePolicy;
use crate::errors::ConfigError;
use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/moods.json";
const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Mock,
    Hosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    File,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub auth_mode: AuthMode,
    pub storage_mode: StorageMode,
    pub duplicate_policy: DuplicatePolicy,
    pub identity_header: String,
    pub sign_in_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            auth_mode: AuthMode::Mock,
            storage_mode: StorageMode::File,
            duplicate_policy: DuplicatePolicy::Allow,
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            sign_in_url: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            config.port = value
                .parse()
                .map_err(|_| invalid("PORT", &value))?;
        }
        if let Some(value) = lookup("APP_DATA_PATH") {
            config.data_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("AUTH_MODE") {
            config.auth_mode = match value.trim() {
                "mock" => AuthMode::Mock,
                "hosted" => AuthMode::Hosted,
                _ => return Err(invalid("AUTH_MODE", &value)),
            };
        }
        if let Some(value) = lookup("STORAGE_MODE") {
            config.storage_mode = match value.trim() {
                "file" => StorageMode::File,
                "memory" => StorageMode::Memory,
                _ => return Err(invalid("STORAGE_MODE", &value)),
            };
        }
        if let Some(value) = lookup("DUPLICATE_POLICY") {
            config.duplicate_policy = value
                .parse()
                .map_err(|_| invalid("DUPLICATE_POLICY", &value))?;
        }
        if let Some(value) = lookup("IDENTITY_HEADER") {
            config.identity_header = value;
        }
        if let Some(value) = lookup("SIGN_IN_URL") {
            config.sign_in_url = value;
        }
        if config.auth_mode == AuthMode::Hosted && config.sign_in_url.trim().is_empty() {
            return Err(ConfigError::Missing("SIGN_IN_URL"));
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}
