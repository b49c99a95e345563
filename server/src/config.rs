//! Server configuration, read from the environment.

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Configuration could not be built from the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the planning poker server.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Host to bind (`HOST`, default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (`PORT`, default `3001`).
    pub port: u16,
    /// Browser origins allowed to open a connection
    /// (`ALLOWED_ORIGINS`, comma separated, default `"http://localhost:3000"`).
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.into()],
        }
    }
}

impl ServerConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source, unset keys fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();

        if let Some(host) = lookup("HOST").filter(|host| !host.trim().is_empty()) {
            config.host = host.trim().into();
        }

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|err: std::num::ParseIntError| ConfigError::InvalidValue {
                    key: "PORT",
                    value: port.clone(),
                    reason: err.to_string(),
                })?;
        }

        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            let allowed_origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();

            if allowed_origins.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "ALLOWED_ORIGINS",
                    value: origins,
                    reason: "at least one origin is required".into(),
                });
            }

            config.allowed_origins = allowed_origins;
        }

        Ok(config)
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3001");
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn port_is_overridable() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[("PORT", "4000")])).unwrap();

        assert_eq!(cfg.port, 4000);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();

        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[(
            "ALLOWED_ORIGINS",
            "http://localhost:3000, https://poker.example ,",
        )]))
        .unwrap();

        assert_eq!(
            cfg.allowed_origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://poker.example".to_string()
            ]
        );
    }

    #[test]
    fn empty_origin_list_is_an_error() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("ALLOWED_ORIGINS", " , ")])).is_err());
    }

    #[test]
    fn blank_host_keeps_default() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[("HOST", "  ")])).unwrap();

        assert_eq!(cfg.host, "0.0.0.0");
    }
}
