//! Settings persistence
//!
//! The mode system reads and writes one block of a larger settings document.
//! The document itself is owned by a [`ConfigStore`]; this module only
//! touches the [`ModeSettings`] entry and preserves every other key.
//!
//! Two stores are provided:
//!
//! - [`JsonFileStore`] - a pretty-printed JSON file on disk
//! - [`MemoryStore`] - an in-process document, for tests and embedding
//!
//! # Locating the settings file
//!
//! [`SettingsLocator::find`] resolves the settings path in this order:
//!
//! 1. **Explicit path** - If provided as an argument
//! 2. **CLAW_MODES_SETTINGS** - Environment variable
//! 3. **Home directory** - `$HOME/.claw_modes/settings.json`
//!
//! # Example
//!
//! ```
//! use claw_modes::mode::ModeSettings;
//! use claw_modes::store::{ConfigStore, MemoryStore, read_mode_settings, write_mode_settings};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), claw_modes::error::ModeError> {
//! let store = MemoryStore::with_document(json!({ "theme": "dark" }));
//!
//! let settings = ModeSettings { active_mode_id: "default".into(), ..Default::default() };
//! write_mode_settings(&store, "modeSettings", &settings)?;
//!
//! let doc = store.load_settings()?.unwrap();
//! assert_eq!(doc["theme"], "dark");
//! assert_eq!(read_mode_settings(Some(&doc), "modeSettings")?, Some(settings));
//! # Ok(())
//! # }
//! ```

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, trace};

use crate::error::ModeError;
use crate::mode::ModeSettings;

/// Default key of the mode block inside the settings document
pub const DEFAULT_SETTINGS_KEY: &str = "modeSettings";

/// Environment variable overriding the settings file location
pub const SETTINGS_PATH_ENV: &str = "CLAW_MODES_SETTINGS";

/// Loads and saves the whole settings document
///
/// Calls are synchronous. No locking or optimistic concurrency is performed:
/// concurrent writers race and the last one wins.
pub trait ConfigStore: Send + Sync {
    /// Load the document, or `None` if nothing has been saved yet
    fn load_settings(&self) -> Result<Option<Value>, ModeError>;

    /// Replace the stored document
    fn save_settings(&self, document: &Value) -> Result<(), ModeError>;
}

/// Extract the mode block from a settings document
///
/// Returns `Ok(None)` when there is no (or a `null`) document, or the key is
/// absent/null.
///
/// # Errors
///
/// - [`ModeError::Store`] if the document root is not a JSON object
/// - [`ModeError::Json`] if the block does not deserialize
pub fn read_mode_settings(
    document: Option<&Value>,
    key: &str,
) -> Result<Option<ModeSettings>, ModeError> {
    let document = match document {
        None | Some(Value::Null) => return Ok(None),
        Some(document) => document,
    };
    let object = as_object(document)?;
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(block) => Ok(Some(serde_json::from_value(block.clone())?)),
    }
}

/// Read-modify-write the mode block, preserving the rest of the document
///
/// A missing or `null` document is replaced by an object holding only the block.
pub fn write_mode_settings(
    store: &dyn ConfigStore,
    key: &str,
    settings: &ModeSettings,
) -> Result<(), ModeError> {
    let mut document = match store.load_settings()? {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(document) => document,
    };

    let Value::Object(object) = &mut document else {
        return Err(ModeError::Store(
            "settings document root is not an object".to_string(),
        ));
    };
    object.insert(key.to_string(), serde_json::to_value(settings)?);

    store.save_settings(&document)?;
    debug!(key, active_mode = %settings.active_mode_id, "mode settings saved");
    Ok(())
}

fn as_object(document: &Value) -> Result<&Map<String, Value>, ModeError> {
    document
        .as_object()
        .ok_or_else(|| ModeError::Store("settings document root is not an object".to_string()))
}

/// Settings document stored as a JSON file
///
/// A missing or empty file loads as `None`. Saves write a sibling temporary
/// file and rename it into place; parent directories are created as needed.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for `path` (the file need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "settings.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConfigStore for JsonFileStore {
    fn load_settings(&self) -> Result<Option<Value>, ModeError> {
        if !self.path.exists() {
            trace!(path = %self.path.display(), "settings file does not exist yet");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save_settings(&self, document: &Value) -> Result<(), ModeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(document)?;
        let temp = self.temp_path();
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        trace!(path = %self.path.display(), "settings file written");
        Ok(())
    }
}

/// Settings document held in memory
///
/// Counts successful saves and can be told to fail them, which makes it the
/// store of choice for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<Value>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with `document`
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            ..Self::default()
        }
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Current document, if any
    pub fn document(&self) -> Option<Value> {
        self.document.lock().ok().and_then(|doc| doc.clone())
    }
}

impl ConfigStore for MemoryStore {
    fn load_settings(&self) -> Result<Option<Value>, ModeError> {
        let document = self
            .document
            .lock()
            .map_err(|_| ModeError::Store("memory store lock poisoned".to_string()))?;
        Ok(document.clone())
    }

    fn save_settings(&self, document: &Value) -> Result<(), ModeError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ModeError::Store("memory store rejected save".to_string()));
        }
        let mut slot = self
            .document
            .lock()
            .map_err(|_| ModeError::Store("memory store lock poisoned".to_string()))?;
        *slot = Some(document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Settings file discovery utility
pub struct SettingsLocator;

impl SettingsLocator {
    /// Find the settings file path
    ///
    /// Searches in the following order:
    /// 1. Explicit `path` argument (if provided)
    /// 2. `CLAW_MODES_SETTINGS` environment variable
    /// 3. `$HOME/.claw_modes/settings.json` (`%USERPROFILE%` on Windows)
    ///
    /// The returned file need not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::Store`] if no home directory can be determined.
    pub fn find(path: Option<&Path>) -> Result<PathBuf, ModeError> {
        // 1. Explicit path
        if let Some(path) = path {
            return Ok(path.to_path_buf());
        }

        // 2. Environment override
        if let Ok(env_path) = std::env::var(SETTINGS_PATH_ENV) {
            if !env_path.trim().is_empty() {
                return Ok(PathBuf::from(env_path));
            }
        }

        // 3. Home directory
        Self::home_dir()
            .map(|home| home.join(".claw_modes").join("settings.json"))
            .ok_or_else(|| ModeError::Store("cannot determine home directory".to_string()))
    }

    fn home_dir() -> Option<PathBuf> {
        ["HOME", "USERPROFILE"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .find(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}
