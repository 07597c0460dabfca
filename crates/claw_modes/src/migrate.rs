//! Built-in mode migration
//!
//! When a new release changes the built-in catalog, the persisted copy of the
//! built-in modes is reconciled against it on start-up. Rules, in order:
//!
//! 1. **Addition** - catalog modes missing from the persisted list are appended
//! 2. **Update** - persisted built-ins whose definition differs from the
//!    catalog are overwritten in place (position is preserved)
//! 3. **Removal** - persisted built-ins the catalog no longer defines are dropped
//!
//! Only entries still flagged `is_built_in` are updated or removed. An entry
//! whose flag was cleared locally is left untouched.
//!
//! Collections are compared as unordered sets, so reordering a catalog mode's
//! tags does not count as a change.
//!
//! # Example
//!
//! ```
//! use claw_modes::catalog::BuiltInCatalog;
//! use claw_modes::migrate::migrate;
//!
//! let catalog = BuiltInCatalog::current();
//! let first = migrate(Vec::new(), catalog);
//! assert!(first.report.changed());
//!
//! let second = migrate(first.modes, catalog);
//! assert!(!second.report.changed());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::catalog::BuiltInCatalog;
use crate::mode::Mode;

/// Ids touched by a migration, per rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Catalog modes appended to the persisted list
    pub added: Vec<String>,
    /// Persisted built-ins overwritten from the catalog
    pub updated: Vec<String>,
    /// Persisted built-ins no longer in the catalog
    pub removed: Vec<String>,
}

impl MigrationReport {
    /// Whether any rule fired and the result must be persisted
    pub fn changed(&self) -> bool {
        !(self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty())
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changed() {
            return f.write_str("built-in modes up to date");
        }
        let mut parts = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("added [{}]", self.added.join(", ")));
        }
        if !self.updated.is_empty() {
            parts.push(format!("updated [{}]", self.updated.join(", ")));
        }
        if !self.removed.is_empty() {
            parts.push(format!("removed [{}]", self.removed.join(", ")));
        }
        f.write_str(&parts.join("; "))
    }
}

/// Outcome of [`migrate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The reconciled built-in mode list
    pub modes: Vec<Mode>,
    /// What changed
    pub report: MigrationReport,
}

/// Reconcile persisted built-in modes with the current catalog
pub fn migrate(persisted: Vec<Mode>, catalog: &BuiltInCatalog) -> Migration {
    let mut modes = persisted;
    let mut report = MigrationReport::default();

    // 1. Addition
    for current in catalog.modes() {
        let key = current.key();
        if !modes.iter().any(|mode| mode.key() == key) {
            info!(mode = %current.id, "adding new built-in mode");
            modes.push(current.clone());
            report.added.push(current.id.clone());
        }
    }

    // 2. Update
    for mode in modes.iter_mut().filter(|mode| mode.is_built_in) {
        let Some(current) = catalog.find(&mode.id) else {
            continue;
        };
        if !same_definition(mode, current) {
            info!(mode = %mode.id, "updating built-in mode from catalog");
            overwrite_definition(mode, current);
            report.updated.push(mode.id.clone());
        }
    }

    // 3. Removal
    modes.retain(|mode| {
        let keep = !mode.is_built_in || catalog.contains(&mode.id);
        if !keep {
            info!(mode = %mode.id, "removing retired built-in mode");
            report.removed.push(mode.id.clone());
        }
        keep
    });

    debug!(catalog_version = %catalog.version(), %report, "built-in mode migration finished");
    Migration { modes, report }
}

fn same_definition(persisted: &Mode, current: &Mode) -> bool {
    persisted.name == current.name
        && persisted.description == current.description
        && persisted.system_prompt == current.system_prompt
        && persisted.preferred_model == current.preferred_model
        && same_tools(&persisted.allowed_tools, &current.allowed_tools)
        && same_set(&persisted.allowed_categories, &current.allowed_categories)
        && same_set(&persisted.excluded_categories, &current.excluded_categories)
        && same_set(&persisted.allowed_tags, &current.allowed_tags)
        && same_set(&persisted.excluded_tags, &current.excluded_tags)
}

fn same_set(a: &[String], b: &[String]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

// Tool ids are unique case-insensitively within a mode
fn same_tools(a: &[String], b: &[String]) -> bool {
    let lower = |items: &[String]| items.iter().map(|t| t.to_lowercase()).collect::<BTreeSet<_>>();
    lower(a) == lower(b)
}

// Field copies are owned clones; the catalog's definitions are never aliased.
fn overwrite_definition(mode: &mut Mode, current: &Mode) {
    mode.name = current.name.clone();
    mode.description = current.description.clone();
    mode.system_prompt = current.system_prompt.clone();
    mode.preferred_model = current.preferred_model.clone();
    mode.allowed_tools = current.allowed_tools.clone();
    mode.allowed_categories = current.allowed_categories.clone();
    mode.excluded_categories = current.excluded_categories.clone();
    mode.allowed_tags = current.allowed_tags.clone();
    mode.excluded_tags = current.excluded_tags.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn built_in(id: &str) -> Mode {
        Mode::builder(id)
            .name(id)
            .allowed_tools(["read"])
            .built_in(true)
            .build()
    }

    fn catalog(modes: Vec<Mode>) -> BuiltInCatalog {
        BuiltInCatalog::new(Version::new(1, 0, 0), modes).unwrap()
    }

    #[test]
    fn test_addition() {
        let catalog = catalog(vec![built_in("default"), built_in("research")]);
        let migration = migrate(vec![built_in("default")], &catalog);

        let ids: Vec<_> = migration.modes.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["default", "research"]);
        assert!(migration.report.changed());
        assert_eq!(migration.report.added, vec!["research"]);
        assert!(migration.report.updated.is_empty());
        assert!(migration.modes[1].is_built_in);
    }

    #[test]
    fn test_idempotent() {
        let catalog = catalog(vec![built_in("default"), built_in("research")]);
        let first = migrate(vec![built_in("default")], &catalog);
        let second = migrate(first.modes.clone(), &catalog);

        assert!(!second.report.changed());
        assert_eq!(second.modes, first.modes);
    }

    #[test]
    fn test_set_fields_are_order_independent() {
        let persisted = Mode::builder("default")
            .name("default")
            .allowed_tools(["Read", "grep"])
            .allowed_tags(["a", "b"])
            .built_in(true)
            .build();
        let current = Mode::builder("default")
            .name("default")
            .allowed_tools(["GREP", "read"])
            .allowed_tags(["b", "a"])
            .build();

        let migration = migrate(vec![persisted.clone()], &catalog(vec![current]));
        assert!(!migration.report.changed());
        assert_eq!(migration.modes, vec![persisted]);
    }

    #[test]
    fn test_update_preserves_position_and_copies_fields() {
        let current = Mode::builder("default")
            .name("Default v2")
            .system_prompt("new prompt")
            .preferred_model("large-model")
            .allowed_categories(["filesystem"])
            .excluded_tags(["write"])
            .build();
        let catalog = catalog(vec![built_in("research"), current]);

        let persisted = vec![
            Mode::builder("custom-ish").allowed_tools(["x"]).build(),
            built_in("default"),
            built_in("research"),
        ];
        let migration = migrate(persisted, &catalog);

        assert_eq!(migration.report.updated, vec!["default"]);
        let updated = &migration.modes[1];
        assert_eq!(updated.id, "default");
        assert_eq!(updated.name, "Default v2");
        assert_eq!(updated.system_prompt, "new prompt");
        assert_eq!(updated.preferred_model, "large-model");
        assert_eq!(updated.allowed_categories, vec!["filesystem"]);
        assert_eq!(updated.excluded_tags, vec!["write"]);
        assert!(updated.is_built_in);
    }

    #[test]
    fn test_update_keeps_persisted_id_spelling() {
        let persisted = Mode::builder("Default").built_in(true).build();
        let migration = migrate(vec![persisted], &catalog(vec![built_in("default")]));

        assert!(migration.report.added.is_empty());
        assert_eq!(migration.report.updated, vec!["Default"]);
        assert_eq!(migration.modes[0].id, "Default");
    }

    #[test]
    fn test_removal_of_retired_built_in() {
        let catalog = catalog(vec![built_in("default")]);
        let migration = migrate(vec![built_in("default"), built_in("legacy")], &catalog);

        assert_eq!(migration.modes.len(), 1);
        assert_eq!(migration.report.removed, vec!["legacy"]);
        assert!(migration.report.changed());
    }

    #[test]
    fn test_cleared_flag_is_exempt() {
        let mut legacy = built_in("legacy");
        legacy.is_built_in = false;
        let mut stale_default = built_in("default");
        stale_default.is_built_in = false;
        stale_default.name = "my own default".to_string();

        let catalog = catalog(vec![built_in("default")]);
        let migration = migrate(vec![stale_default.clone(), legacy.clone()], &catalog);

        assert!(!migration.report.changed());
        assert_eq!(migration.modes, vec![stale_default, legacy]);
    }

    #[test]
    fn test_report_display() {
        let report = MigrationReport {
            added: vec!["research".into()],
            updated: vec![],
            removed: vec!["legacy".into(), "old".into()],
        };
        assert_eq!(report.to_string(), "added [research]; removed [legacy, old]");
        assert_eq!(
            MigrationReport::default().to_string(),
            "built-in modes up to date"
        );
    }
}
