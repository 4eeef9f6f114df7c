//! Nickname rules and generator word lists.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NicknameConfig {
    pub min_length: u32,
    /// Longer client-supplied names are truncated, not rejected.
    pub max_length: u32,
    /// Regex a client-supplied name must match.
    pub pattern: String,
    pub adjectives: Vec<String>,
    pub animals: Vec<String>,
}

impl Default for NicknameConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 32,
            pattern: r"^[\p{L}\p{N}_\- ]+$".into(),
            adjectives: ["Red", "Blue", "Green", "Yellow", "Quick", "Lazy", "Happy"]
                .into_iter()
                .map(String::from)
                .collect(),
            animals: ["Tiger", "Elephant", "Fox", "Panda", "Giraffe", "Cat", "Dog"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
