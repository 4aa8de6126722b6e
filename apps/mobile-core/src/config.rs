/// Client configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Sitedocs mobile API (e.g. `https://api.sitedocs.example/mobile`).
    pub api_url: String,
    /// WebSocket endpoint for live events (e.g. `wss://api.sitedocs.example/ws`).
    pub gateway_url: String,
    /// Per-request timeout for HTTP calls, in seconds.
    pub request_timeout_secs: u64,
    /// Handshake timeout for the event channel, in seconds.
    pub connect_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            api_url: required_var("SITEDOCS_API_URL"),
            gateway_url: required_var("SITEDOCS_GATEWAY_URL"),
            request_timeout_secs: std::env::var("SITEDOCS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            connect_timeout_secs: std::env::var("SITEDOCS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}
