//! Sparse configuration overrides addressed by dotted path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Override value as supplied by the user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    /// `true` / `false`
    Bool(bool),
    /// Integer or float
    Number(f64),
    /// Free text (colours, rotation strings)
    Text(String),
    /// Array (colour channels, state lists)
    List(Vec<OverrideValue>),
}

impl OverrideValue {
    /// Interpret as a boolean
    pub fn as_bool(&self, key: &str) -> Result<bool, ConfigError> {
        match self {
            OverrideValue::Bool(b) => Ok(*b),
            OverrideValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" => Ok(true),
                "false" | "off" | "no" => Ok(false),
                _ => Err(ConfigError::invalid(key, format!("expected boolean, got {s:?}"))),
            },
            other => Err(ConfigError::invalid(key, format!("expected boolean, got {other}"))),
        }
    }

    /// Interpret as a finite number
    pub fn as_f64(&self, key: &str) -> Result<f64, ConfigError> {
        let value = match self {
            OverrideValue::Number(n) => *n,
            OverrideValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::invalid(key, format!("expected number, got {s:?}")))?,
            other => {
                return Err(ConfigError::invalid(key, format!("expected number, got {other}")));
            }
        };
        if !value.is_finite() {
            return Err(ConfigError::invalid(key, "number must be finite"));
        }
        Ok(value)
    }

    /// Interpret as a number within `[min, max]`
    pub fn as_f32_in(&self, key: &str, min: f32, max: f32) -> Result<f32, ConfigError> {
        let value = self.as_f64(key)? as f32;
        if value < min || value > max {
            return Err(ConfigError::invalid(
                key,
                format!("{value} is outside {min}..={max}"),
            ));
        }
        Ok(value)
    }

    /// Interpret as a list of non-negative integers
    pub fn as_u32_list(&self, key: &str) -> Result<Vec<u32>, ConfigError> {
        let OverrideValue::List(items) = self else {
            return Err(ConfigError::invalid(key, format!("expected list, got {self}")));
        };
        items
            .iter()
            .map(|item| {
                let n = item.as_f64(key)?;
                if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
                    return Err(ConfigError::invalid(
                        key,
                        format!("expected non-negative integer, got {n}"),
                    ));
                }
                Ok(n as u32)
            })
            .collect()
    }

    /// Convert a parsed TOML value
    ///
    /// Tables are not values; callers flatten them into dotted paths first.
    pub fn from_toml(value: &toml::Value) -> Option<Self> {
        match value {
            toml::Value::Boolean(b) => Some(OverrideValue::Bool(*b)),
            toml::Value::Integer(i) => Some(OverrideValue::Number(*i as f64)),
            toml::Value::Float(f) => Some(OverrideValue::Number(*f)),
            toml::Value::String(s) => Some(OverrideValue::Text(s.clone())),
            toml::Value::Array(items) => items
                .iter()
                .map(OverrideValue::from_toml)
                .collect::<Option<Vec<_>>>()
                .map(OverrideValue::List),
            toml::Value::Datetime(d) => Some(OverrideValue::Text(d.to_string())),
            toml::Value::Table(_) => None,
        }
    }

    /// Parse a command-line value using TOML literal syntax, falling back to text
    pub fn parse_literal(raw: &str) -> Self {
        let raw = raw.trim();
        toml::from_str::<toml::Table>(&format!("v = {raw}"))
            .ok()
            .and_then(|table| table.get("v").and_then(OverrideValue::from_toml))
            .unwrap_or_else(|| OverrideValue::Text(raw.to_string()))
    }
}

impl fmt::Display for OverrideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideValue::Bool(b) => write!(f, "{b}"),
            OverrideValue::Number(n) => write!(f, "{n}"),
            OverrideValue::Text(s) => write!(f, "{s:?}"),
            OverrideValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// One `(path, value)` override
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverride {
    /// Dotted path, e.g. `transform.trim.left`
    pub path: String,
    /// New value
    pub value: OverrideValue,
}

impl ConfigOverride {
    /// Create an override
    pub fn new(path: impl Into<String>, value: OverrideValue) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// Path split into segments
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('.').map(str::trim).collect()
    }

    /// Flatten a TOML table into dotted overrides (keys in table order)
    pub fn flatten_toml(prefix: &str, table: &toml::Table, out: &mut Vec<ConfigOverride>) {
        for (key, value) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                toml::Value::Table(inner) => Self::flatten_toml(&path, inner, out),
                other => match OverrideValue::from_toml(other) {
                    Some(value) => out.push(ConfigOverride::new(path, value)),
                    None => log::warn!("Ignoring non-scalar configuration value at {}", path),
                },
            }
        }
    }
}

impl FromStr for ConfigOverride {
    type Err = ConfigError;

    /// Parse `path=value`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, raw) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::invalid(s, "expected path=value"))?;
        let path = path.trim();
        if path.is_empty() || path.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(ConfigError::invalid(s, "empty path segment"));
        }
        Ok(ConfigOverride::new(path, OverrideValue::parse_literal(raw)))
    }
}
