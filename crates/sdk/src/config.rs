//! Client configuration
//!
//! Layered with the `config` crate, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `config.toml` in the platform config dir)
//! 3. `IMHOTEP_*` environment variables (`IMHOTEP_API_URL`, ...)

use crate::error::{Result, SdkError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use imhotep_core::application::PollPolicy;
use imhotep_core::domain::DEFAULT_SAMPLE_DATASET_ID;
use imhotep_core::port::session::{DEFAULT_AUTH_COOKIE, DEFAULT_TENANT_COOKIE};
use imhotep_infra_http::{HttpBackendConfig, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "IMHOTEP";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    /// Event stream base URL; `api_url` when unset
    #[serde(default)]
    pub stream_url: Option<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub poll_interval_secs: u64,
    /// 0 means no cap
    pub poll_max_attempts: u32,
    pub poll_backoff_factor: f64,
    pub poll_max_interval_secs: u64,
    pub auth_cookie_name: String,
    pub tenant_cookie_name: String,
    pub sample_dataset_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            stream_url: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            poll_interval_secs: 5,
            poll_max_attempts: 720,
            poll_backoff_factor: 1.0,
            poll_max_interval_secs: 60,
            auth_cookie_name: DEFAULT_AUTH_COOKIE.to_string(),
            tenant_cookie_name: DEFAULT_TENANT_COOKIE.to_string(),
            sample_dataset_id: DEFAULT_SAMPLE_DATASET_ID.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults, then the config file, then the environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let builder = match path {
            Some(raw) => {
                let path = expand_path(raw);
                Self::defaults()?.add_source(File::from(path).format(FileFormat::Toml))
            }
            None => match default_config_path() {
                Some(path) => Self::defaults()?
                    .add_source(File::from(path).format(FileFormat::Toml).required(false)),
                None => Self::defaults()?,
            },
        };

        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .ignore_empty(true),
        );
        Self::finish(builder)
    }

    /// Defaults overlaid with a TOML document (no environment)
    pub fn from_toml(toml: &str) -> Result<Self> {
        Self::finish(Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let d = Self::default();
        Ok(Config::builder()
            .set_default("api_url", d.api_url)?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
            .set_default("connect_timeout_secs", d.connect_timeout_secs as i64)?
            .set_default("poll_interval_secs", d.poll_interval_secs as i64)?
            .set_default("poll_max_attempts", d.poll_max_attempts as i64)?
            .set_default("poll_backoff_factor", d.poll_backoff_factor)?
            .set_default("poll_max_interval_secs", d.poll_max_interval_secs as i64)?
            .set_default("auth_cookie_name", d.auth_cookie_name)?
            .set_default("tenant_cookie_name", d.tenant_cookie_name)?
            .set_default("sample_dataset_id", d.sample_dataset_id)?)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(SdkError::Config("api_url cannot be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(SdkError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.poll_backoff_factor.is_nan() || self.poll_backoff_factor < 1.0 {
            return Err(SdkError::Config(format!(
                "poll_backoff_factor must be >= 1.0, got {}",
                self.poll_backoff_factor
            )));
        }
        if self.poll_max_interval_secs < self.poll_interval_secs {
            return Err(SdkError::Config(
                "poll_max_interval_secs must not be below poll_interval_secs".to_string(),
            ));
        }
        Ok(())
    }

    pub fn http(&self) -> HttpBackendConfig {
        let http = HttpBackendConfig::new(self.api_url.clone()).with_timeouts(
            Duration::from_secs(self.request_timeout_secs),
            Duration::from_secs(self.connect_timeout_secs),
        );
        match &self.stream_url {
            Some(url) if !url.trim().is_empty() => http.with_stream_url(url.clone()),
            _ => http,
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        let max_attempts = (self.poll_max_attempts > 0).then_some(self.poll_max_attempts);
        PollPolicy::fixed(Duration::from_secs(self.poll_interval_secs))
            .with_backoff(
                self.poll_backoff_factor,
                Duration::from_secs(self.poll_max_interval_secs),
            )
            .with_max_attempts(max_attempts)
    }
}

/// `config.toml` in the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "imhotep", "imhotep").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn expand_path(raw: &str) -> PathBuf {
    Path::new(shellexpand::tilde(raw).as_ref()).to_path_buf()
}
