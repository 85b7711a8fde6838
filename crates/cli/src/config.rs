use std::path::PathBuf;

use adgen_client::config::{ClientConfig, ConfigError};
use adgen_core::polling::DEFAULT_RESUME_MAX_AGE_MINS;

/// Default location of the session file, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = ".adgen-session.json";

/// Settings for the `adgen` binary.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub client: ClientConfig,
    /// Where pending jobs and the selected product are persisted.
    pub session_file: PathBuf,
    /// Stored jobs older than this are dropped instead of resumed.
    pub resume_max_age: chrono::Duration,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default               |
    /// |-----------------------------|-----------------------|
    /// | `ADGEN_SESSION_FILE`        | `.adgen-session.json` |
    /// | `ADGEN_RESUME_MAX_AGE_MINS` | `30`                  |
    ///
    /// plus everything read by [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client = ClientConfig::from_lookup(&lookup)?;

        let session_file = lookup("ADGEN_SESSION_FILE")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.into());

        let max_age_mins: i64 = match lookup("ADGEN_RESUME_MAX_AGE_MINS") {
            None => DEFAULT_RESUME_MAX_AGE_MINS,
            Some(raw) => raw
                .trim()
                .parse()
                .ok()
                .filter(|m| *m >= 0)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "ADGEN_RESUME_MAX_AGE_MINS",
                    expected: "a non-negative number of minutes",
                    value: raw.clone(),
                })?,
        };

        Ok(Self {
            client,
            session_file: PathBuf::from(session_file),
            resume_max_age: chrono::Duration::minutes(max_age_mins),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.session_file, PathBuf::from(".adgen-session.json"));
        assert_eq!(config.resume_max_age, chrono::Duration::minutes(30));
        assert_eq!(config.client.api_url, "http://localhost:8000/api");
    }

    #[test]
    fn reads_overrides() {
        let config = CliConfig::from_lookup(lookup(&[
            ("ADGEN_SESSION_FILE", "/tmp/adgen.json"),
            ("ADGEN_RESUME_MAX_AGE_MINS", "5"),
            ("ADGEN_API_URL", "https://api.example.com"),
        ]))
        .unwrap();
        assert_eq!(config.session_file, PathBuf::from("/tmp/adgen.json"));
        assert_eq!(config.resume_max_age, chrono::Duration::minutes(5));
        assert_eq!(config.client.api_url, "https://api.example.com");
    }

    #[test]
    fn negative_max_age_is_rejected() {
        let err = CliConfig::from_lookup(lookup(&[("ADGEN_RESUME_MAX_AGE_MINS", "-1")]))
            .unwrap_err();
        assert!(err.to_string().starts_with("ADGEN_RESUME_MAX_AGE_MINS"));
    }
}
