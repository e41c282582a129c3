//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timetable start time and fallback task duration
//! - Default ratings and domain for new tasks
//! - Advisory service endpoint, model and timeout
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::record::{hhmm, Domain, Rating, DEFAULT_DURATION_MIN};
use crate::scheduler::SchedulerConfig;

/// Timetable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_duration")]
    pub default_duration: u32,
}

/// Defaults applied to new tasks when the user leaves a field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_rating")]
    pub importance: f64,
    #[serde(default = "default_rating")]
    pub urgency: f64,
    #[serde(default)]
    pub domain: Domain,
}

/// Advisory service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

// Default functions
fn default_start_time() -> String {
    "08:00".into()
}
fn default_duration() -> u32 {
    DEFAULT_DURATION_MIN
}
fn default_rating() -> f64 {
    3.0
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_model() -> String {
    "gemini-2.5-flash-lite".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            default_duration: default_duration(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            importance: default_rating(),
            urgency: default_rating(),
            domain: Domain::default(),
        }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the resulting config is invalid.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        hhmm::parse_time(&self.schedule.start_time)
            .map_err(|e| invalid("schedule.start_time", e.to_string()))?;
        if self.schedule.default_duration == 0 {
            return Err(invalid(
                "schedule.default_duration",
                "must be at least 1 minute".into(),
            ));
        }
        Rating::for_field("importance", self.defaults.importance)
            .map_err(|e| invalid("defaults.importance", e.to_string()))?;
        Rating::for_field("urgency", self.defaults.urgency)
            .map_err(|e| invalid("defaults.urgency", e.to_string()))?;
        url::Url::parse(&self.advisory.endpoint)
            .map_err(|e| invalid("advisory.endpoint", e.to_string()))?;
        Ok(())
    }

    pub fn start_time(&self) -> NaiveTime {
        hhmm::parse_time(&self.schedule.start_time)
            .unwrap_or_else(|_| NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn default_importance(&self) -> Rating {
        Rating::clamped(self.defaults.importance)
    }

    pub fn default_urgency(&self) -> Rating {
        Rating::clamped(self.defaults.urgency)
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            default_duration_min: self.schedule.default_duration.max(1),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.start_time, "08:00");
        assert_eq!(parsed.advisory.model, "gemini-2.5-flash-lite");
        assert_eq!(parsed.defaults.domain, Domain::Work);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[schedule]\nstart_time = \"09:30\"\n").unwrap();
        assert_eq!(parsed.schedule.start_time, "09:30");
        assert_eq!(parsed.schedule.default_duration, 60);
        assert_eq!(parsed.defaults.importance, 3.0);
        assert_eq!(parsed.advisory.timeout_secs, 30);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("schedule.start_time").as_deref(), Some("08:00"));
        assert_eq!(cfg.get("schedule.default_duration").as_deref(), Some("60"));
        assert_eq!(cfg.get("defaults.domain").as_deref(), Some("work"));
        assert!(cfg.get("schedule.missing_key").is_none());
        assert!(cfg.get("schedule").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("schedule.start_time", "09:15").unwrap();
        cfg.apply("defaults.importance", "4.5").unwrap();
        cfg.apply("advisory.timeout_secs", "10").unwrap();
        cfg.apply("defaults.domain", "study").unwrap();
        assert_eq!(cfg.start_time(), hhmm::parse_time("09:15").unwrap());
        assert_eq!(cfg.default_importance().value(), 4.5);
        assert_eq!(cfg.advisory.timeout_secs, 10);
        assert_eq!(cfg.defaults.domain, Domain::Study);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("schedule.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.apply("schedule", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_values_and_keeps_state() {
        let mut cfg = Config::default();
        assert!(cfg.apply("schedule.start_time", "25:99").is_err());
        assert!(cfg.apply("defaults.urgency", "7").is_err());
        assert!(cfg.apply("defaults.domain", "garden").is_err());
        assert!(cfg.apply("schedule.default_duration", "abc").is_err());
        assert_eq!(cfg.schedule.start_time, "08:00");
        assert_eq!(cfg.defaults.urgency, 3.0);
    }

    #[test]
    fn entries_list_every_leaf() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"schedule.start_time".to_string()));
        assert!(keys.contains(&"advisory.endpoint".to_string()));
        assert!(keys.contains(&"defaults.urgency".to_string()));
    }
}
