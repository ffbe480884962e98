// Provider configuration: a flat key/value map.
//
// Providers read well-known keys (`client_id`, `redirect`, ...) and may accept
// several spellings for one setting; `first_of` resolves those in order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys loaded by `ProviderConfig::from_env`, paired with their env suffix.
const ENV_KEYS: &[(&str, &str)] = &[
    ("client_id", "CLIENT_ID"),
    ("client_secret", "CLIENT_SECRET"),
    ("redirect", "REDIRECT"),
    ("corp_id", "CORP_ID"),
    ("corp_secret", "CORP_SECRET"),
    ("agent_id", "AGENT_ID"),
];

/// Configuration for a single provider instance.
///
/// Deserializes from any map, e.g. a `[wework]` TOML table or a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig(Map<String, Value>);

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, returning the config for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Read a key as a string. Numbers and booleans are rendered; null,
    /// arrays and objects read as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// First non-empty value among `keys`, in order.
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn client_id(&self) -> Option<String> {
        self.first_of(&["client_id"])
    }

    pub fn client_secret(&self) -> Option<String> {
        self.first_of(&["client_secret"])
    }

    pub fn redirect(&self) -> Option<String> {
        self.first_of(&["redirect"])
    }

    /// Load `{PREFIX}_CLIENT_ID`, `{PREFIX}_CORP_SECRET`, ... from the process
    /// environment.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = prefix.trim_end_matches('_').to_uppercase();
        let mut config = Self::new();
        for (key, suffix) in ENV_KEYS {
            if let Some(value) = lookup(&format!("{prefix}_{suffix}")) {
                config.set(*key, value);
            }
        }
        config
    }
}

impl From<Map<String, Value>> for ProviderConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
