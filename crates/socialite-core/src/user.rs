// Normalized user returned by every provider.
//
// Attributes are kept as a JSON map so providers decide per field whether a
// missing value is omitted or present as `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user resolved by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    attributes: Map<String, Value>,
    /// Upstream payload the attributes were mapped from.
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<Value>,
    /// Name of the provider that issued this user (e.g. "wework-provider").
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
}

impl User {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            raw: None,
            provider: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.str_attribute("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attribute("name")
    }

    pub fn nickname(&self) -> Option<&str> {
        self.str_attribute("nickname").or_else(|| self.name())
    }

    pub fn email(&self) -> Option<&str> {
        self.str_attribute("email")
    }

    pub fn avatar(&self) -> Option<&str> {
        self.str_attribute("avatar")
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    fn str_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn set_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    pub fn set_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }
}
