//! Configuration options and builder for the mode manager
//!
//! This module provides `ModeManagerOptions` for configuring where mode
//! settings are persisted and which built-in catalog is migrated towards.
//!
//! # Example
//!
//! ```
//! use claw_modes::options::ModeManagerOptions;
//!
//! let options = ModeManagerOptions::builder()
//!     .settings_path("/tmp/claw/settings.json")
//!     .settings_key("modes")
//!     .build();
//!
//! assert_eq!(options.settings_key, "modes");
//! ```

use std::path::PathBuf;

use crate::catalog::BuiltInCatalog;
use crate::store::DEFAULT_SETTINGS_KEY;

/// Configuration options for [`ModeManager`](crate::manager::ModeManager)
///
/// All fields have sensible defaults: the settings file is located with
/// [`SettingsLocator`](crate::store::SettingsLocator), the mode block lives
/// under `"modeSettings"` and the shipped catalog is used.
#[derive(Debug, Clone)]
pub struct ModeManagerOptions {
    /// Settings file path (None = discover)
    pub settings_path: Option<PathBuf>,
    /// Key of the mode block in the settings document
    pub settings_key: String,
    /// Built-in catalog override (None = [`BuiltInCatalog::current`])
    pub catalog: Option<BuiltInCatalog>,
}

impl Default for ModeManagerOptions {
    fn default() -> Self {
        Self {
            settings_path: None,
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
            catalog: None,
        }
    }
}

impl ModeManagerOptions {
    /// Create a new options builder
    pub fn builder() -> ModeManagerOptionsBuilder {
        ModeManagerOptionsBuilder::default()
    }

    /// The catalog to migrate towards
    pub fn catalog(&self) -> &BuiltInCatalog {
        self.catalog.as_ref().unwrap_or_else(|| BuiltInCatalog::current())
    }
}

/// Builder for [`ModeManagerOptions`]
#[derive(Debug, Default)]
pub struct ModeManagerOptionsBuilder {
    inner: ModeManagerOptions,
}

impl ModeManagerOptionsBuilder {
    /// Set settings file path
    pub fn settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.settings_path = Some(path.into());
        self
    }

    /// Set key of the mode block in the settings document
    pub fn settings_key(mut self, key: impl Into<String>) -> Self {
        self.inner.settings_key = key.into();
        self
    }

    /// Override the built-in catalog
    pub fn catalog(mut self, catalog: BuiltInCatalog) -> Self {
        self.inner.catalog = Some(catalog);
        self
    }

    /// Build the options
    pub fn build(self) -> ModeManagerOptions {
        self.inner
    }
}
