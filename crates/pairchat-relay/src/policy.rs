//! Content policy applied to chat text before it reaches the broker.

use pairchat_common::ConfigError;
use pairchat_config::PolicyConfig;
use regex::{Captures, Regex};

pub trait ContentPolicy: Send + Sync {
    /// Return the text to relay, possibly rewritten, or `None` to drop it.
    fn apply(&self, text: String) -> Option<String>;
}

/// Length limit plus whole-word masking of blocked words.
#[derive(Debug, Clone)]
pub struct StandardPolicy {
    max_length: usize,
    blocked: Option<Regex>,
    mask_char: char,
}

impl StandardPolicy {
    pub fn from_config(config: &PolicyConfig) -> Result<Self, ConfigError> {
        let blocked = if config.blocked_words.is_empty() {
            None
        } else {
            let words: Vec<String> = config
                .blocked_words
                .iter()
                .map(|w| regex::escape(w.trim()))
                .collect();
            let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                ConfigError::ValidationError(format!("policy.blocked_words: {e}"))
            })?)
        };

        Ok(Self {
            max_length: config.max_message_length as usize,
            blocked,
            mask_char: config.mask_char,
        })
    }
}

impl ContentPolicy for StandardPolicy {
    fn apply(&self, text: String) -> Option<String> {
        if text.trim().is_empty() || text.chars().count() > self.max_length {
            return None;
        }
        let Some(blocked) = &self.blocked else {
            return Some(text);
        };
        let masked = blocked.replace_all(&text, |caps: &Captures| {
            self.mask_char.to_string().repeat(caps[0].chars().count())
        });
        Some(masked.into_owned())
    }
}
