//! Purpose: Process-wide settings resolved once at startup.
//! Exports: `Settings`, `SERVER_URL_ENV`, `DEFAULT_SERVER_URL`.
//! Invariants: An empty `EXPRESS_SERVER_URL` is treated the same as an unset one.
//! Invariants: A `--url` flag always overrides the resolved default.

pub const SERVER_URL_ENV: &str = "EXPRESS_SERVER_URL";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub server_url: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(SERVER_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self { server_url }
    }

    pub fn server_url(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .unwrap_or_else(|| self.server_url.clone())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}
