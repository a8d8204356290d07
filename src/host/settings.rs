//! Settings dictionary
//!
//! String/bool key-value store handed to `create` and `update`. Defaults are
//! kept separately so a reset returns to them without losing user values
//! elsewhere.

use std::collections::HashMap;

/// A single settings value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    String(String),
    Bool(bool),
}

/// Settings for one source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: HashMap<String, SettingValue>,
    defaults: HashMap<String, SettingValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string value
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .insert(key.to_string(), SettingValue::String(value.into()));
    }

    /// Set a bool value
    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), SettingValue::Bool(value));
    }

    /// Set the default for a string key
    pub fn set_default_string(&mut self, key: &str, value: impl Into<String>) {
        self.defaults
            .insert(key.to_string(), SettingValue::String(value.into()));
    }

    /// Set the default for a bool key
    pub fn set_default_bool(&mut self, key: &str, value: bool) {
        self.defaults.insert(key.to_string(), SettingValue::Bool(value));
    }

    /// Builder form of `set_string`
    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_string(key, value);
        self
    }

    /// Builder form of `set_bool`
    pub fn with_bool(mut self, key: &str, value: bool) -> Self {
        self.set_bool(key, value);
        self
    }

    fn lookup(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key).or_else(|| self.defaults.get(key))
    }

    /// String value, falling back to the default, then to ""
    pub fn get_string(&self, key: &str) -> &str {
        match self.lookup(key) {
            Some(SettingValue::String(s)) => s,
            _ => "",
        }
    }

    /// Bool value, falling back to the default, then to false
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.lookup(key), Some(SettingValue::Bool(true)))
    }

    /// Whether a user value (not a default) is set
    pub fn has_user_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Drop a user value so the default applies again
    pub fn erase(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Overlay another settings object's user values onto this one
    pub fn apply(&mut self, other: &Settings) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }
}
