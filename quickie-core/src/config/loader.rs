//! Configuration loading

use super::schema::Config;
use super::validate::validate_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";
const PATH_OVERRIDE_PREFIX: &str = "QUICKIE__";

/// How an alias variable's raw text is turned into a JSON value
#[derive(Clone, Copy)]
enum AliasKind {
    /// Kept verbatim (credentials may look like numbers)
    Text,
    /// Parsed like a path override
    Parsed,
}

/// Environment names used by existing deployments
const ENV_ALIASES: &[(&str, &str, AliasKind)] = &[
    ("GEMINI_API_KEY", "model.api_key", AliasKind::Text),
    ("GEMINI_MODEL", "model.model", AliasKind::Text),
    ("REDIS_HOST", "cache.host", AliasKind::Text),
    ("REDIS_PORT", "cache.port", AliasKind::Parsed),
    ("REDIS_USERNAME", "cache.username", AliasKind::Text),
    ("REDIS_PASSWORD", "cache.password", AliasKind::Text),
    ("ALLOWED_ORIGIN", "cors.allowed_origin", AliasKind::Text),
    ("PORT", "server.port", AliasKind::Parsed),
];

/// Optional string fields, null by default, that path overrides must keep
/// as text
const NULLABLE_TEXT_PATHS: &[&str] = &[
    "cache.username",
    "cache.password",
    "model.system_instruction",
];

/// Configuration loader
///
/// Precedence, lowest first: built-in defaults, `config.json` in the
/// config directory, alias environment variables, then
/// `QUICKIE__SECTION__FIELD` path overrides.
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".quickie"))
            .unwrap_or_else(|| PathBuf::from(".quickie"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_dir.join(CONFIG_FILE);
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content)?;
            merge_values(&mut merged, file_value);
        }

        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let config_path = self.config_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_env_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Number(v.into());
    }
    if let Ok(v) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(v) {
            return Value::Number(n);
        }
    }
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        return v;
    }
    Value::String(raw.to_string())
}

fn set_path_value(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(last.clone(), value);
    }
}

fn apply_alias_overrides(config: &mut Value) {
    for (env_key, target_path, kind) in ENV_ALIASES {
        let Ok(raw) = std::env::var(env_key) else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }
        let value = match kind {
            AliasKind::Text => Value::String(raw),
            AliasKind::Parsed => parse_env_value(&raw),
        };
        let path: Vec<String> = target_path.split('.').map(ToString::to_string).collect();
        set_path_value(config, &path, value);
    }
}

fn apply_path_overrides(config: &mut Value) {
    for (key, value) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(PATH_OVERRIDE_PREFIX) else {
            continue;
        };
        let segments: Vec<String> = suffix
            .split("__")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect();
        if segments.is_empty() {
            continue;
        }
        let value = if is_text_path(config, &segments) {
            Value::String(value)
        } else {
            parse_env_value(&value)
        };
        set_path_value(config, &segments, value);
    }
}

/// Whether the field at `path` holds text, so a number-like override such as
/// a numeric password is not coerced
fn is_text_path(config: &Value, path: &[String]) -> bool {
    if NULLABLE_TEXT_PATHS.contains(&path.join(".").as_str()) {
        return true;
    }
    path.iter()
        .try_fold(config, |current, segment| current.get(segment))
        .is_some_and(Value::is_string)
}
