//! Configuration schema types for Pairchat.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod broker;
mod logging;
mod nickname;
mod policy;
mod server;

pub use broker::*;
pub use logging::*;
pub use nickname::*;
pub use policy::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root configuration for the relay server.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairchatConfig {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub nickname: NicknameConfig,
    pub policy: PolicyConfig,
    pub logging: LoggingConfig,
}
