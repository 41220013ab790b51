//! Portal configuration parsed from environment variables.

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Request paths that never move the loading indicator: the auth endpoints
/// and the streaming channels.
pub const DEFAULT_UNTRACKED_PREFIXES: &[&str] =
    &["/users/login", "/users/register", "/users/resetpassword", "/notifications/stream", "/ws"];

/// Route prefixes the bootstrap guard lets through without a session check.
pub const DEFAULT_BOOTSTRAP_BYPASS_PREFIXES: &[&str] = &["/auth"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub api_url: String,
    pub connect_timeout_secs: u64,
    pub untracked_prefixes: Vec<String>,
    pub bootstrap_bypass_prefixes: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            untracked_prefixes: to_owned_list(DEFAULT_UNTRACKED_PREFIXES),
            bootstrap_bypass_prefixes: to_owned_list(DEFAULT_BOOTSTRAP_BYPASS_PREFIXES),
        }
    }
}

impl PortalConfig {
    /// Build typed portal config from environment variables.
    ///
    /// Optional:
    /// - `API_URL`: backend base URL, default `http://localhost:8080/api`
    /// - `PORTAL_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PORTAL_UNTRACKED_PREFIXES`: comma-separated request path prefixes
    /// - `PORTAL_BOOTSTRAP_BYPASS_PREFIXES`: comma-separated route prefixes
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(std::env::var("API_URL").ok().as_deref())?;
        let connect_timeout_secs =
            env_parse_u64("PORTAL_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let untracked_prefixes = env_list("PORTAL_UNTRACKED_PREFIXES", DEFAULT_UNTRACKED_PREFIXES);
        let bootstrap_bypass_prefixes =
            env_list("PORTAL_BOOTSTRAP_BYPASS_PREFIXES", DEFAULT_BOOTSTRAP_BYPASS_PREFIXES);

        Ok(Self { api_url, connect_timeout_secs, untracked_prefixes, bootstrap_bypass_prefixes })
    }

    /// Replace the API base URL, applying the same normalisation as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or not http(s).
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(Some(api_url))?;
        Ok(self)
    }
}

fn normalize_api_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let url = raw.map_or(DEFAULT_API_URL, str::trim).trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid { var: "API_URL".into(), value: url.to_owned() });
    }
    Ok(url.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { var: key.to_owned(), value: raw }),
        Err(_) => Ok(default),
    }
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => parse_list(&raw),
        Err(_) => to_owned_list(default),
    }
}

pub(crate) fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
