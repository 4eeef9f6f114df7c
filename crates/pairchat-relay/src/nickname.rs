//! Identity collaborator: picks the display nickname for a new connection.

use pairchat_common::{ConfigError, IdentityError};
use pairchat_config::NicknameConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

/// Names a connection from its handshake query string, or refuses it.
pub trait IdentityProvider: Send + Sync {
    fn identify(&self, query: Option<&str>) -> Result<String, IdentityError>;
}

/// Uses `?name=` when given, otherwise generates `<Adjective><Animal><n>`.
#[derive(Debug, Clone)]
pub struct NicknameProvider {
    min_length: usize,
    max_length: usize,
    pattern: Regex,
    adjectives: Vec<String>,
    animals: Vec<String>,
}

impl NicknameProvider {
    pub fn from_config(config: &NicknameConfig) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&config.pattern).map_err(|e| {
            ConfigError::ValidationError(format!("nickname.pattern is not a valid regex: {e}"))
        })?;
        Ok(Self {
            min_length: config.min_length as usize,
            max_length: config.max_length as usize,
            pattern,
            adjectives: config.adjectives.clone(),
            animals: config.animals.clone(),
        })
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let adjective = self
            .adjectives
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or("Quiet");
        let animal = self
            .animals
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or("Stranger");
        let number: u32 = rng.gen_range(0..100);
        format!("{adjective}{animal}{number}")
    }

    fn check(&self, requested: &str) -> Result<String, IdentityError> {
        let name: String = requested.chars().take(self.max_length).collect();
        let name = name.trim_end().to_string();

        if name.chars().count() < self.min_length {
            return Err(IdentityError::InvalidNickname(format!(
                "shorter than {} characters",
                self.min_length
            )));
        }
        if !self.pattern.is_match(&name) {
            return Err(IdentityError::InvalidNickname(format!(
                "{name:?} contains disallowed characters"
            )));
        }
        Ok(name)
    }
}

impl IdentityProvider for NicknameProvider {
    fn identify(&self, query: Option<&str>) -> Result<String, IdentityError> {
        match requested_name(query)? {
            Some(name) if !name.trim().is_empty() => self.check(name.trim()),
            _ => Ok(self.generate()),
        }
    }
}

/// Percent-decoded value of the `name` query parameter.
fn requested_name(query: Option<&str>) -> Result<Option<String>, IdentityError> {
    let Some(query) = query else {
        return Ok(None);
    };
    let Some(raw) = query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == "name").then_some(value)
    }) else {
        return Ok(None);
    };

    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|name| Some(name.into_owned()))
        .map_err(|e| IdentityError::InvalidNickname(format!("bad percent-encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> NicknameProvider {
        NicknameProvider::from_config(&NicknameConfig::default()).unwrap()
    }

    fn is_generated(name: &str, config: &NicknameConfig) -> bool {
        config.adjectives.iter().any(|adj| {
            name.strip_prefix(adj.as_str()).is_some_and(|rest| {
                config.animals.iter().any(|animal| {
                    rest.strip_prefix(animal.as_str()).is_some_and(|n| {
                        !n.is_empty() && n.parse::<u32>().is_ok_and(|n| n < 100)
                    })
                })
            })
        })
    }

    #[test]
    fn uses_requested_name() {
        assert_eq!(provider().identify(Some("name=Alice")).unwrap(), "Alice");
    }

    #[test]
    fn decodes_percent_and_plus() {
        let p = provider();
        assert_eq!(p.identify(Some("name=Jos%C3%A9+M")).unwrap(), "José M");
        assert_eq!(p.identify(Some("room=1&name=Bo%20B")).unwrap(), "Bo B");
    }

    #[test]
    fn missing_or_blank_name_is_generated() {
        let p = provider();
        let config = NicknameConfig::default();
        for query in [None, Some(""), Some("room=lobby"), Some("name="), Some("name=+++")] {
            let name = p.identify(query).unwrap();
            assert!(is_generated(&name, &config), "{name} from {query:?}");
        }
    }

    #[test]
    fn long_names_are_truncated() {
        let config = NicknameConfig {
            max_length: 5,
            ..NicknameConfig::default()
        };
        let p = NicknameProvider::from_config(&config).unwrap();
        assert_eq!(p.identify(Some("name=Bartholomew")).unwrap(), "Barth");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let config = NicknameConfig {
            max_length: 2,
            ..NicknameConfig::default()
        };
        let p = NicknameProvider::from_config(&config).unwrap();
        assert_eq!(p.identify(Some("name=%C3%A9%C3%A9%C3%A9")).unwrap(), "éé");
    }

    #[test]
    fn disallowed_characters_are_rejected() {
        let err = provider().identify(Some("name=%3Cscript%3E")).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidNickname(_)));
    }

    #[test]
    fn too_short_is_rejected() {
        let config = NicknameConfig {
            min_length: 3,
            ..NicknameConfig::default()
        };
        let p = NicknameProvider::from_config(&config).unwrap();
        assert!(p.identify(Some("name=Al")).is_err());
        assert_eq!(p.identify(Some("name=Ali")).unwrap(), "Ali");
    }

    #[test]
    fn invalid_percent_encoding_is_rejected() {
        assert!(provider().identify(Some("name=%FF%FE")).is_err());
    }

    #[test]
    fn generated_names_use_word_lists() {
        let config = NicknameConfig {
            adjectives: vec!["Calm".into()],
            animals: vec!["Owl".into()],
            ..NicknameConfig::default()
        };
        let p = NicknameProvider::from_config(&config).unwrap();
        for _ in 0..20 {
            let name = p.generate();
            assert!(name.starts_with("CalmOwl"), "{name}");
            assert!(is_generated(&name, &config));
        }
    }

    #[test]
    fn bad_pattern_fails_construction() {
        let config = NicknameConfig {
            pattern: "[".into(),
            ..NicknameConfig::default()
        };
        assert!(NicknameProvider::from_config(&config).is_err());
    }
}
