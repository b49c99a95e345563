const SERVER_URL_KEY: &str = "POKER_SERVER_URL";
const DEFAULT_SERVER_URL: &str = "ws://localhost:3001";

/// Settings of the terminal client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// WebSocket url of the session server
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let server_url = lookup(SERVER_URL_KEY)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        ClientConfig { server_url }
    }
}
