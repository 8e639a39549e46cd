// Runtime configuration. Built once in `main` and handed to every service
// constructor; nothing in the library reads the environment on its own.

use std::env;

pub const DEFAULT_BASE_URL: &str = "https://rest.mintitv.com/api/v1";

pub const ENV_API_URL: &str = "MINTSCAN_API_URL";
pub const ENV_USER: &str = "MINTSCAN_USER";
pub const ENV_PASS: &str = "MINTSCAN_PASS";
pub const ENV_TOKEN: &str = "MINTSCAN_TOKEN";

/// Connection settings and the default credentials for one invocation.
#[derive(Clone, Debug)]
pub struct Config {
    base_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            user: None,
            password: None,
            token: None,
        }
    }

    /// Read `MINTSCAN_API_URL` (falling back to the public endpoint) and the
    /// optional `MINTSCAN_USER`, `MINTSCAN_PASS` and `MINTSCAN_TOKEN`.
    pub fn from_env() -> Self {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let base_url = non_empty(ENV_API_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Config::new(base_url);
        config.user = non_empty(ENV_USER);
        config.password = non_empty(ENV_PASS);
        config.token = non_empty(ENV_TOKEN);
        config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_BASE_URL)
    }
}
