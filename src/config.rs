use crate::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// Reserved key identifying which registry entry a config selects.
pub const TYPE_KEY: &str = "type";

pub(crate) const CONTRACT_MSG: &str = "configuration must be a mapping containing key \"type\"";

/// A scalar configuration value. Anything richer (nested mappings, lists)
/// is rejected at the parsing boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Numeric view; integers widen to floats so `{"negative_slope": 1}`
    /// behaves like `{"negative_slope": 1.0}`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Value {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

/// A configuration record: option name -> scalar value, with the reserved
/// `"type"` key naming the component to build. The factory only ever works
/// on a clone, so the caller keeps ownership of its record untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: HashMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config pre-filled with the `"type"` key.
    pub fn of_type(name: &str) -> Self {
        Config::new().set(TYPE_KEY, name)
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// The component name under the reserved key, or a contract error when
    /// the key is absent or not a string.
    pub fn component_type(&self) -> Result<&str> {
        self.get(TYPE_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| BuildError::InvalidConfig(CONTRACT_MSG.to_string()))
    }

    pub fn take_f64(&mut self, key: &str) -> Result<Option<f64>> {
        match self.remove(key) {
            None => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| {
                BuildError::InvalidParameter(format!("parameter `{}` must be a number", key))
            }),
        }
    }

    pub fn take_usize(&mut self, key: &str) -> Result<Option<usize>> {
        match self.remove(key) {
            None => Ok(None),
            Some(v) => match v.as_i64() {
                Some(n) if n >= 0 => Ok(Some(n as usize)),
                _ => Err(BuildError::InvalidParameter(format!(
                    "parameter `{}` must be a non-negative integer",
                    key
                ))),
            },
        }
    }

    pub fn take_bool(&mut self, key: &str) -> Result<Option<bool>> {
        match self.remove(key) {
            None => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or_else(|| {
                BuildError::InvalidParameter(format!("parameter `{}` must be a boolean", key))
            }),
        }
    }

    pub fn take_str(&mut self, key: &str) -> Result<Option<String>> {
        match self.remove(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(_) => Err(BuildError::InvalidParameter(format!(
                "parameter `{}` must be a string",
                key
            ))),
        }
    }

    /// Reject leftover parameters the target constructor did not consume.
    pub fn expect_empty(&self, component: &str) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        Err(BuildError::InvalidParameter(format!(
            "unknown parameters for {}: {}",
            component,
            keys.join(", ")
        )))
    }

    /// Parse a config record from a JSON document. The document must be an
    /// object of scalar values; anything else violates the factory contract.
    pub fn from_json_str(s: &str) -> Result<Config> {
        let parsed: serde_json::Value = serde_json::from_str(s)?;
        let map = match parsed {
            serde_json::Value::Object(map) => map,
            _ => return Err(BuildError::InvalidConfig(CONTRACT_MSG.to_string())),
        };
        let mut cfg = Config::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::String(s) => Value::Str(s),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Value::Int(i),
                    None => match n.as_f64() {
                        Some(f) => Value::Float(f),
                        None => {
                            return Err(BuildError::InvalidConfig(format!(
                                "value for key `{}` is out of range",
                                key
                            )))
                        }
                    },
                },
                _ => {
                    return Err(BuildError::InvalidConfig(format!(
                        "value for key `{}` must be a scalar",
                        key
                    )))
                }
            };
            cfg.entries.insert(key, value);
        }
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Config> {
        let mut raw = String::new();
        File::open(path)?.read_to_string(&mut raw)?;
        Config::from_json_str(&raw)
    }

    /// Binary snapshot of the record, for caching resolved configs between runs.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let encoded: Vec<u8> = bincode::serialize(self)?;
        File::create(path)?.write_all(&encoded)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let mut buffer = Vec::new();
        File::open(path)?.read_to_end(&mut buffer)?;
        let cfg = bincode::deserialize(&buffer)?;
        Ok(cfg)
    }
}
