//! Raw render options and their lenient typed accessors
//!
//! Options arrive as a flat `name -> value` mapping produced by a command
//! line or prompt adapter. Accessors never fail: malformed values are
//! logged and replaced by the supplied default, numbers are clamped to
//! their bounds.
use crate::{ColorResolver, RGBA, RenderError};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Error returned by `FromStr` implementations of option enums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionError {
    pub value: String,
    pub expected: &'static str,
}

impl OptionError {
    pub fn new(value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            value: value.into(),
            expected,
        }
    }
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected value {:?}, expected {}", self.value, self.expected)
    }
}

impl std::error::Error for OptionError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RenderOptions {
    values: BTreeMap<String, String>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Merge other options on top of these
    pub fn extend(&mut self, other: RenderOptions) {
        self.values.extend(other.values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read options from a JSON object of strings
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_owned()
    }

    /// Same as `string` but the escape sequence `\n` is turned into a new line
    pub fn text(&self, key: &str, default: &str) -> String {
        self.string(key, default).replace("\\n", "\n")
    }

    /// Flags carry no value, their presence inverts the default
    pub fn flag(&self, key: &str, default: bool) -> bool {
        if self.contains(key) { !default } else { default }
    }

    /// Integer clamped to `[min, max]`, malformed value results in `default`
    pub fn int(&self, key: &str, default: i64, min: i64, max: i64) -> i64 {
        let Some(value) = self.get(key) else {
            return default;
        };
        match value.trim().parse::<i64>() {
            Ok(parsed) => {
                let clamped = parsed.clamp(min, max);
                if clamped != parsed {
                    invalid(key, value, format!("clamped to {}", clamped));
                }
                clamped
            }
            Err(error) => {
                invalid(key, value, format!("{}, using {}", error, default));
                default
            }
        }
    }

    /// Value parsed with `FromStr`, malformed value results in `default`
    pub fn parsed<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr<Err = OptionError> + fmt::Display,
    {
        let Some(value) = self.get(key) else {
            return default;
        };
        match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(error) => {
                invalid(key, value, format!("{}, using {}", error, default));
                default
            }
        }
    }

    /// Space separated color tokens, see [`ColorResolver::resolve_many`]
    pub fn colors(
        &self,
        key: &str,
        default: &[RGBA],
        resolver: &mut ColorResolver<'_>,
    ) -> Vec<RGBA> {
        match self.get(key) {
            Some(tokens) => resolver.resolve_many(tokens),
            None => default.to_vec(),
        }
    }
}

fn invalid(key: &str, value: &str, reason: String) {
    let error = RenderError::InvalidOption {
        key: key.to_owned(),
        value: value.to_owned(),
        reason,
    };
    tracing::warn!("[options] {}", error);
}

impl<K, V> FromIterator<(K, V)> for RenderOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
