use serde::{Deserialize, Serialize};

/// Pairing broker queue sizes and housekeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Depth of the command channel feeding the broker loop.
    pub command_capacity: u32,
    /// Depth of each connection's outbound event queue. Events beyond
    /// this are dropped rather than stalling the broker.
    pub outbox_capacity: u32,
    /// Seconds between broker stats log lines. 0 disables them.
    pub stats_interval_secs: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            command_capacity: 1024,
            outbox_capacity: 256,
            stats_interval_secs: 60,
        }
    }
}
