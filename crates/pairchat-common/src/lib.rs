pub mod errors;
pub mod id;

pub use errors::{ConfigError, IdentityError, RelayError};
pub use id::ParticipantId;

pub type Result<T> = std::result::Result<T, RelayError>;
