//! Built-in mode catalog
//!
//! The catalog is the versioned, read-only list of modes shipped with the
//! software. On every start-up the persisted built-in modes are migrated
//! towards it (see [`crate::migrate`]). A catalog always contains the
//! [`DEFAULT_MODE_ID`] mode.

use semver::Version;
use std::sync::OnceLock;

use crate::error::ModeError;
use crate::mode::{DEFAULT_MODE_ID, Mode, ModeKey};

/// Version of the catalog returned by [`BuiltInCatalog::current`]
pub const CATALOG_VERSION: Version = Version::new(1, 2, 0);

/// A versioned list of built-in modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInCatalog {
    version: Version,
    modes: Vec<Mode>,
}

impl BuiltInCatalog {
    /// Create a catalog
    ///
    /// Modes are normalized and flagged built-in. Later entries whose id
    /// repeats an earlier one are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::MissingDefaultMode`] if no mode has id `"default"`.
    pub fn new(version: Version, modes: Vec<Mode>) -> Result<Self, ModeError> {
        let mut unique: Vec<Mode> = Vec::with_capacity(modes.len());
        for mode in modes {
            let mut mode = mode.normalize();
            mode.is_built_in = true;
            if !unique.iter().any(|m| m.key() == mode.key()) {
                unique.push(mode);
            }
        }

        let catalog = Self {
            version,
            modes: unique,
        };
        if catalog.default_mode().is_none() {
            return Err(ModeError::MissingDefaultMode);
        }
        Ok(catalog)
    }

    #[cfg(test)]
    pub(crate) fn unchecked(version: Version, modes: Vec<Mode>) -> Self {
        Self { version, modes }
    }

    /// The catalog shipped with this build
    pub fn current() -> &'static BuiltInCatalog {
        static CURRENT: OnceLock<BuiltInCatalog> = OnceLock::new();
        CURRENT.get_or_init(|| BuiltInCatalog {
            version: CATALOG_VERSION,
            modes: shipped_modes(),
        })
    }

    /// Catalog version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Modes in catalog order
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Look up a mode by id (case-insensitive)
    pub fn find(&self, id: &str) -> Option<&Mode> {
        let key = ModeKey::new(id);
        self.modes.iter().find(|mode| mode.key() == key)
    }

    /// Whether the catalog defines `id`
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// The `"default"` mode
    pub fn default_mode(&self) -> Option<&Mode> {
        self.find(DEFAULT_MODE_ID)
    }
}

fn shipped_modes() -> Vec<Mode> {
    vec![
        Mode::builder(DEFAULT_MODE_ID)
            .name("Default")
            .description("General-purpose mode with access to every standard tool")
            .system_prompt(
                "You are a helpful assistant with access to local files, GitHub and the web.",
            )
            .allowed_categories(["filesystem", "github", "web"])
            .built_in(true)
            .build(),
        Mode::builder("research")
            .name("Research")
            .description("Read-only exploration of code and documentation")
            .system_prompt(
                "You are a research assistant. Gather information; never modify anything.",
            )
            .allowed_categories(["filesystem", "github", "web"])
            .excluded_tags(["write"])
            .built_in(true)
            .build(),
        Mode::builder("code")
            .name("Code")
            .description("Local and repository editing without web access")
            .system_prompt("You are a software engineer working in the user's repository.")
            .allowed_categories(["filesystem", "github"])
            .built_in(true)
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_catalog_has_default() {
        let catalog = BuiltInCatalog::current();
        assert!(catalog.default_mode().is_some());
        assert_eq!(catalog.version(), &CATALOG_VERSION);
        assert!(catalog.modes().iter().all(|m| m.is_built_in));
        assert!(catalog.contains("Research"));
    }

    #[test]
    fn test_new_flags_built_in_and_dedups() {
        let catalog = BuiltInCatalog::new(
            Version::new(2, 0, 0),
            vec![
                Mode::builder("default").allowed_tools(["a"]).build(),
                Mode::builder("DEFAULT").allowed_tools(["b"]).build(),
                Mode::builder("extra").allowed_tools(["c"]).build(),
            ],
        )
        .unwrap();

        assert_eq!(catalog.modes().len(), 2);
        assert!(catalog.modes().iter().all(|m| m.is_built_in));
        assert_eq!(catalog.find("default").unwrap().allowed_tools, vec!["a"]);
    }

    #[test]
    fn test_new_without_default_is_rejected() {
        let result = BuiltInCatalog::new(
            Version::new(1, 0, 0),
            vec![Mode::builder("research").allowed_tools(["a"]).build()],
        );
        assert!(matches!(result, Err(ModeError::MissingDefaultMode)));
    }
}
