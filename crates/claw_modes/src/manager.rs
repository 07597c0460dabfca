//! Active mode ownership and custom mode CRUD
//!
//! [`ModeManager`] is the entry point of the crate. Construction runs the
//! start-up sequence:
//!
//! 1. Load the settings document from the [`ConfigStore`]
//! 2. Seed the built-in catalog on first run, otherwise drop duplicate
//!    persisted built-ins and migrate the rest towards the current catalog
//! 3. Drop custom modes that have no id, collide with another mode, or grant
//!    no tools
//! 4. Reset the active mode to `"default"` if it no longer exists
//! 5. Persist if anything changed
//!
//! If the `"default"` built-in cannot be found afterwards, construction fails
//! with [`ModeError::MissingDefaultMode`].
//!
//! Tool sets are resolved on every access and never cached across
//! mutations. Mutations are staged on a copy of the settings and only
//! committed once the store accepted the save.
//!
//! The manager is meant for a single-process CLI session and performs no
//! internal locking.
//!
//! # Example
//!
//! ```
//! use claw_modes::manager::ModeManager;
//! use claw_modes::mode::Mode;
//! use claw_modes::registry::{InMemoryToolRegistry, ToolDescriptor};
//! use claw_modes::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), claw_modes::error::ModeError> {
//! let registry = InMemoryToolRegistry::new()
//!     .with_tool(ToolDescriptor::new("search_files", "filesystem").with_tags(["read-only"]))
//!     .with_tool(ToolDescriptor::new("write_file", "filesystem").with_tags(["write"]));
//!
//! let mut manager = ModeManager::new(Arc::new(registry), Arc::new(MemoryStore::new()))?;
//! assert_eq!(manager.current_mode_id(), "default");
//!
//! manager.add_custom_mode(Mode::builder("scout").allowed_tags(["read-only"]).build())?;
//! manager.set_current_mode("Scout")?;
//!
//! assert!(manager.is_tool_allowed_in_current_mode("search_files"));
//! assert!(!manager.is_tool_allowed_in_current_mode("write_file"));
//! # Ok(())
//! # }
//! ```

use semver::Version;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::catalog::BuiltInCatalog;
use crate::error::ModeError;
use crate::migrate::{MigrationReport, migrate};
use crate::mode::{DEFAULT_MODE_ID, Mode, ModeKey, ModeSettings, ResolvedMode};
use crate::options::ModeManagerOptions;
use crate::permissions::ModePermissionHandler;
use crate::registry::ToolRegistry;
use crate::resolver::resolve;
use crate::store::{
    ConfigStore, DEFAULT_SETTINGS_KEY, JsonFileStore, SettingsLocator, read_mode_settings,
    write_mode_settings,
};

/// Owns the active mode and the persisted mode collection
pub struct ModeManager {
    registry: Arc<dyn ToolRegistry>,
    store: Arc<dyn ConfigStore>,
    catalog: BuiltInCatalog,
    settings_key: String,
    settings: ModeSettings,
    last_migration: MigrationReport,
}

impl ModeManager {
    /// Initialize with the shipped catalog and the default settings key
    ///
    /// # Errors
    ///
    /// - [`ModeError::MissingDefaultMode`] if `"default"` is missing after migration (fatal)
    /// - Store and (de)serialization errors from loading or persisting settings
    pub fn new(
        registry: Arc<dyn ToolRegistry>,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self, ModeError> {
        Self::initialize(
            registry,
            store,
            BuiltInCatalog::current().clone(),
            DEFAULT_SETTINGS_KEY.to_string(),
        )
    }

    /// Initialize against an explicit store, honoring catalog and key options
    pub fn with_options(
        registry: Arc<dyn ToolRegistry>,
        store: Arc<dyn ConfigStore>,
        options: ModeManagerOptions,
    ) -> Result<Self, ModeError> {
        let catalog = options.catalog().clone();
        Self::initialize(registry, store, catalog, options.settings_key)
    }

    /// Initialize against a [`JsonFileStore`] at the located settings path
    pub fn from_options(
        registry: Arc<dyn ToolRegistry>,
        options: ModeManagerOptions,
    ) -> Result<Self, ModeError> {
        let path = SettingsLocator::find(options.settings_path.as_deref())?;
        debug!(path = %path.display(), "using settings file");
        Self::with_options(registry, Arc::new(JsonFileStore::new(path)), options)
    }

    fn initialize(
        registry: Arc<dyn ToolRegistry>,
        store: Arc<dyn ConfigStore>,
        catalog: BuiltInCatalog,
        settings_key: String,
    ) -> Result<Self, ModeError> {
        let document = store.load_settings()?;
        let mut last_migration = MigrationReport::default();

        let (mut settings, mut dirty) =
            match read_mode_settings(document.as_ref(), &settings_key)? {
                None => {
                    info!(
                        catalog_version = %catalog.version(),
                        "no mode settings found, seeding built-in modes"
                    );
                    (ModeSettings::seeded(&catalog), true)
                }
                Some(mut settings) => {
                    let (persisted, mut dirty) =
                        dedup_built_in_modes(std::mem::take(&mut settings.default_modes));
                    let migration = migrate(persisted, &catalog);
                    settings.default_modes = migration.modes;
                    last_migration = migration.report;

                    if last_migration.changed() {
                        info!(report = %last_migration, "built-in modes migrated");
                        dirty = true;
                    }
                    dirty |= prune_custom_modes(&mut settings, registry.as_ref());
                    (settings, dirty)
                }
            };

        dirty |= sync_catalog_version(&mut settings, &catalog);
        dirty |= ensure_active_mode(&mut settings);

        if settings.find_default(DEFAULT_MODE_ID).is_none() {
            error!("built-in mode 'default' missing after migration");
            return Err(ModeError::MissingDefaultMode);
        }

        if dirty {
            write_mode_settings(store.as_ref(), &settings_key, &settings)?;
        }

        debug!(
            active = %settings.active_mode_id,
            built_in = settings.default_modes.len(),
            custom = settings.custom_modes.len(),
            "mode manager initialized"
        );

        Ok(Self {
            registry,
            store,
            catalog,
            settings_key,
            settings,
            last_migration,
        })
    }

    fn resolve_mode(&self, mode: &Mode) -> ResolvedMode {
        ResolvedMode::new(mode.clone(), resolve(mode, self.registry.as_ref()))
    }

    fn commit(&mut self, staged: ModeSettings) -> Result<(), ModeError> {
        write_mode_settings(self.store.as_ref(), &self.settings_key, &staged)?;
        self.settings = staged;
        Ok(())
    }

    /// The active mode with a freshly resolved tool set
    pub fn get_current_mode(&self) -> Result<ResolvedMode, ModeError> {
        self.get_mode(&self.settings.active_mode_id)
            .ok_or_else(|| ModeError::NotFound {
                id: self.settings.active_mode_id.clone(),
            })
    }

    /// Id of the active mode
    pub fn current_mode_id(&self) -> &str {
        &self.settings.active_mode_id
    }

    /// Switch the active mode and persist the choice
    ///
    /// # Errors
    ///
    /// - [`ModeError::InvalidInput`] if `id` is blank
    /// - [`ModeError::NotFound`] if no mode has this id
    /// - [`ModeError::EmptyToolSet`] if the mode currently grants no tools
    pub fn set_current_mode(&mut self, id: &str) -> Result<ResolvedMode, ModeError> {
        if ModeKey::new(id).is_blank() {
            return Err(ModeError::InvalidInput("mode id must not be blank".to_string()));
        }
        let resolved = self
            .get_mode(id)
            .ok_or_else(|| ModeError::NotFound { id: id.to_string() })?;
        if resolved.tools().is_empty() {
            return Err(ModeError::EmptyToolSet {
                id: resolved.id().to_string(),
            });
        }

        let mut staged = self.settings.clone();
        staged.active_mode_id = resolved.id().to_string();
        self.commit(staged)?;

        info!(mode = %resolved.id(), tools = resolved.tools().len(), "active mode switched");
        Ok(resolved)
    }

    /// Look up any mode by id (case-insensitive), freshly resolved
    pub fn get_mode(&self, id: &str) -> Option<ResolvedMode> {
        self.settings.find(id).map(|mode| self.resolve_mode(mode))
    }

    /// All modes, built-ins first then custom modes, each freshly resolved
    pub fn get_available_modes(&self) -> Vec<ResolvedMode> {
        self.settings
            .all_modes()
            .map(|mode| self.resolve_mode(mode))
            .collect()
    }

    /// Add a user-defined mode
    ///
    /// The mode is normalized and always stored with `is_built_in = false`.
    ///
    /// # Errors
    ///
    /// - [`ModeError::InvalidInput`] if the id is blank
    /// - [`ModeError::DuplicateMode`] if the id collides (case-insensitive) with any mode
    /// - [`ModeError::EmptyToolSet`] if the mode grants no tools
    pub fn add_custom_mode(&mut self, mode: Mode) -> Result<ResolvedMode, ModeError> {
        let mut mode = mode.normalize();
        if mode.key().is_blank() {
            return Err(ModeError::InvalidInput("mode id must not be blank".to_string()));
        }
        if self.settings.contains(&mode.id) {
            return Err(ModeError::DuplicateMode { id: mode.id });
        }
        mode.is_built_in = false;

        let tools = resolve(&mode, self.registry.as_ref());
        if tools.is_empty() {
            return Err(ModeError::EmptyToolSet { id: mode.id });
        }

        let mut staged = self.settings.clone();
        staged.custom_modes.push(mode.clone());
        self.commit(staged)?;

        info!(mode = %mode.id, tools = tools.len(), "custom mode added");
        Ok(ResolvedMode::new(mode, tools))
    }

    /// Remove a user-defined mode
    ///
    /// If it was active, the active mode reverts to `"default"`.
    ///
    /// # Errors
    ///
    /// - [`ModeError::InvalidInput`] if `id` is blank
    /// - [`ModeError::BuiltInImmutable`] if `id` names a built-in mode
    /// - [`ModeError::NotFound`] if no custom mode has this id
    pub fn remove_custom_mode(&mut self, id: &str) -> Result<Mode, ModeError> {
        let key = ModeKey::new(id);
        if key.is_blank() {
            return Err(ModeError::InvalidInput("mode id must not be blank".to_string()));
        }
        let Some(index) = self.settings.custom_position(id) else {
            return Err(match self.settings.find_default(id) {
                Some(mode) => ModeError::BuiltInImmutable { id: mode.id.clone() },
                None => ModeError::NotFound { id: id.to_string() },
            });
        };
        if self.settings.custom_modes[index].is_built_in {
            return Err(ModeError::BuiltInImmutable { id: id.to_string() });
        }

        let mut staged = self.settings.clone();
        let removed = staged.custom_modes.remove(index);
        if ModeKey::new(&staged.active_mode_id) == key {
            info!(mode = %removed.id, "removed mode was active, reverting to default");
            staged.active_mode_id = DEFAULT_MODE_ID.to_string();
        }
        self.commit(staged)?;

        info!(mode = %removed.id, "custom mode removed");
        Ok(removed)
    }

    /// Whether the active mode grants `tool_name` (exact match)
    pub fn is_tool_allowed_in_current_mode(&self, tool_name: &str) -> bool {
        self.get_current_mode()
            .map(|mode| mode.is_tool_allowed(tool_name))
            .unwrap_or(false)
    }

    /// Permission handler snapshot of the active mode
    pub fn permission_handler(&self) -> Result<ModePermissionHandler, ModeError> {
        Ok(ModePermissionHandler::for_mode(&self.get_current_mode()?))
    }

    /// User-defined modes in stored order
    pub fn custom_modes(&self) -> &[Mode] {
        &self.settings.custom_modes
    }

    /// The in-memory settings block
    pub fn settings(&self) -> &ModeSettings {
        &self.settings
    }

    /// The catalog this manager migrated towards
    pub fn catalog(&self) -> &BuiltInCatalog {
        &self.catalog
    }

    /// What the start-up migration changed
    pub fn last_migration(&self) -> &MigrationReport {
        &self.last_migration
    }
}

/// Normalize persisted built-ins and drop later entries whose id is already taken
fn dedup_built_in_modes(persisted: Vec<Mode>) -> (Vec<Mode>, bool) {
    let mut seen: HashSet<ModeKey> = HashSet::new();
    let mut changed = false;
    let mut modes = Vec::with_capacity(persisted.len());

    for mode in persisted.into_iter().map(Mode::normalize) {
        if !seen.insert(mode.key()) {
            warn!(mode = %mode.id, "dropping duplicate built-in mode");
            changed = true;
            continue;
        }
        modes.push(mode);
    }

    (modes, changed)
}

/// Drop invalid custom modes; returns whether anything changed
fn prune_custom_modes(settings: &mut ModeSettings, registry: &dyn ToolRegistry) -> bool {
    let mut taken: HashSet<ModeKey> = settings.default_modes.iter().map(Mode::key).collect();
    let mut changed = false;

    for mode in std::mem::take(&mut settings.custom_modes) {
        let mut mode = mode.normalize();
        let key = mode.key();
        if key.is_blank() {
            warn!("dropping custom mode without an id");
            changed = true;
            continue;
        }
        if resolve(&mode, registry).is_empty() {
            warn!(mode = %mode.id, "dropping custom mode that grants no tools");
            changed = true;
            continue;
        }
        if !taken.insert(key) {
            warn!(mode = %mode.id, "dropping custom mode whose id is already taken");
            changed = true;
            continue;
        }
        if mode.is_built_in {
            mode.is_built_in = false;
            changed = true;
        }
        settings.custom_modes.push(mode);
    }

    changed
}

/// Reset a dangling active mode id; returns whether it changed
fn ensure_active_mode(settings: &mut ModeSettings) -> bool {
    if settings.contains(&settings.active_mode_id) {
        return false;
    }
    warn!(
        active = %settings.active_mode_id,
        "active mode no longer exists, falling back to default"
    );
    settings.active_mode_id = DEFAULT_MODE_ID.to_string();
    true
}

/// Record the running catalog version; returns whether it changed
fn sync_catalog_version(settings: &mut ModeSettings, catalog: &BuiltInCatalog) -> bool {
    let running = catalog.version();
    if let Some(persisted) = settings.catalog_version.as_deref() {
        match Version::parse(persisted) {
            Ok(version) if version == *running => return false,
            Ok(version) if version > *running => {
                warn!(
                    persisted = %version,
                    running = %running,
                    "settings were written by a newer catalog"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(persisted, error = %e, "ignoring unparseable catalog version"),
        }
    }
    settings.catalog_version = Some(running.to_string());
    true
}
