//! Full configuration validation.
//!
//! Each section has its own check; this orchestrator calls them all and
//! collects errors into a single `ConfigError`.

mod helpers;


use crate::schema::PairchatConfig;
use pairchat_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PairchatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&mut errors, config);
    validate_broker(&mut errors, config);
    validate_nickname(&mut errors, config);
    validate_policy(&mut errors, config);
    validate_logging(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_server(errors: &mut Vec<String>, config: &PairchatConfig) {
    validate_range(errors, "server.port", config.server.port, 1, 65535);
    validate_range(
        errors,
        "server.handshake_timeout_secs",
        config.server.handshake_timeout_secs,
        1,
        300,
    );
    if config.server.bind.trim().is_empty() {
        errors.push("server.bind must not be empty".into());
    }
}

fn validate_broker(errors: &mut Vec<String>, config: &PairchatConfig) {
    validate_range(
        errors,
        "broker.command_capacity",
        config.broker.command_capacity,
        1,
        1_000_000,
    );
    validate_range(
        errors,
        "broker.outbox_capacity",
        config.broker.outbox_capacity,
        1,
        1_000_000,
    );
}

fn validate_nickname(errors: &mut Vec<String>, config: &PairchatConfig) {
    let nick = &config.nickname;
    validate_range(errors, "nickname.min_length", nick.min_length, 1, 256);
    validate_range(errors, "nickname.max_length", nick.max_length, 1, 256);
    if nick.min_length > nick.max_length {
        errors.push(format!(
            "nickname.min_length ({}) exceeds nickname.max_length ({})",
            nick.min_length, nick.max_length
        ));
    }
    if let Err(e) = regex::Regex::new(&nick.pattern) {
        errors.push(format!("nickname.pattern is not a valid regex: {e}"));
    }
    if nick.adjectives.is_empty() {
        errors.push("nickname.adjectives must not be empty".into());
    }
    if nick.animals.is_empty() {
        errors.push("nickname.animals must not be empty".into());
    }
}

fn validate_policy(errors: &mut Vec<String>, config: &PairchatConfig) {
    validate_range(
        errors,
        "policy.max_message_length",
        config.policy.max_message_length,
        1,
        1_000_000,
    );
    if config.policy.mask_char.is_control() || config.policy.mask_char.is_whitespace() {
        errors.push("policy.mask_char must be a printable character".into());
    }
    if config.policy.blocked_words.iter().any(|w| w.trim().is_empty()) {
        errors.push("policy.blocked_words must not contain empty entries".into());
    }
}

fn validate_logging(errors: &mut Vec<String>, config: &PairchatConfig) {
    if config.logging.filter.trim().is_empty() {
        errors.push("logging.filter must not be empty".into());
    }
}
