//! Content Types
//!
//! Response body families and the flat mapping they are parsed into.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// JSON media type, also the default when none is declared.
pub const JSON_CONTENT: &str = "application/json";
/// URL-encoded form media type.
pub const URL_ENCODED_CONTENT: &str = "application/x-www-form-urlencoded";
/// XML media type.
pub const XML_CONTENT: &str = "application/xml";

/// Supported response body encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentFamily {
    Json,
    UrlEncoded,
    Xml,
}

impl ContentFamily {
    /// Families in matching order.
    pub const ALL: [ContentFamily; 3] = [Self::Json, Self::UrlEncoded, Self::Xml];

    /// Media type substring that selects this family.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Json => JSON_CONTENT,
            Self::UrlEncoded => URL_ENCODED_CONTENT,
            Self::Xml => XML_CONTENT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::UrlEncoded => "urlencoded",
            Self::Xml => "xml",
        }
    }

    /// First family whose media type is contained in `content_type`.
    pub fn detect(content_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| content_type.contains(family.media_type()))
    }
}

impl fmt::Display for ContentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value view of a response body.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedResponse {
    family: ContentFamily,
    values: HashMap<String, Value>,
}

impl ParsedResponse {
    pub fn new(family: ContentFamily, values: HashMap<String, Value>) -> Self {
        Self { family, values }
    }

    /// Family the body was parsed as.
    pub fn family(&self) -> ContentFamily {
        self.family
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value, with numbers rendered as text.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Integer value, accepting integer strings.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.values
    }
}
