use serde::{Deserialize, Serialize};

/// Content policy applied to chat text before it reaches the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Messages longer than this many characters are dropped.
    pub max_message_length: u32,
    /// Whole words masked out of chat text (case-insensitive).
    pub blocked_words: Vec<String>,
    pub mask_char: char,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            blocked_words: Vec::new(),
            mask_char: '*',
        }
    }
}
