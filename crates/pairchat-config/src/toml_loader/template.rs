//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Pairchat relay configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# bind = "0.0.0.0"
# port = 3000                  # 1-65535
# handshake_timeout_secs = 10  # 1-300

[broker]
# command_capacity = 1024      # >= 1
# outbox_capacity = 256        # >= 1
# stats_interval_secs = 60     # 0 disables

[nickname]
# min_length = 1
# max_length = 32
# pattern = '^[\p{L}\p{N}_\- ]+$'
# adjectives = ["Red", "Blue", "Green", "Yellow", "Quick", "Lazy", "Happy"]
# animals = ["Tiger", "Elephant", "Fox", "Panda", "Giraffe", "Cat", "Dog"]

[policy]
# max_message_length = 2000
# blocked_words = []
# mask_char = "*"

[logging]
# filter = "pairchat_relay=info,pairchat_broker=info"
"##
    .to_string()
}
