use serde::{Deserialize, Serialize};

/// Network listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the WebSocket listener to.
    pub bind: String,
    pub port: u32,
    /// Seconds a client gets to finish the WebSocket upgrade.
    pub handshake_timeout_secs: u32,
}

impl ServerConfig {
    /// `bind:port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
            handshake_timeout_secs: 10,
        }
    }
}
