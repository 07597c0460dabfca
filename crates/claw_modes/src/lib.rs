//! Claw Modes - mode resolution and migration for tool-executing agents
//!
//! This crate decides, for a given operating "mode", exactly which callable
//! tools are enabled, and keeps a user's persisted modes in step with the
//! built-in mode definitions shipped by each release.
//!
//! # Overview
//!
//! - A [`Mode`](mode::Mode) grants tools through explicit names, category
//!   memberships and tag memberships, minus excluded categories and tags
//! - The resolver turns a mode into its effective tool set against a
//!   [`ToolRegistry`](registry::ToolRegistry)
//! - The migrator reconciles persisted built-in modes with the current
//!   [`BuiltInCatalog`](catalog::BuiltInCatalog) on every start-up
//! - The [`ModeManager`](manager::ModeManager) owns the active mode and the
//!   user's custom modes, persisting through a [`ConfigStore`](store::ConfigStore)
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//! - `mode`: Mode data model and the persisted settings block
//! - `registry`: Tool catalog lookup (category/tag -> tools)
//! - `resolver`: Effective tool set computation
//! - `catalog`: Built-in modes shipped with the software
//! - `migrate`: Built-in mode reconciliation across versions
//! - `store`: Settings document persistence
//! - `manager`: Start-up sequence, active mode and custom mode CRUD
//! - `permissions`: Tool-use gate backed by the active mode
//! - `error`: Error types and handling
//!
//! # Example
//!
//! ```rust,no_run
//! use claw_modes::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), ModeError> {
//!     let registry = InMemoryToolRegistry::new()
//!         .with_tool(ToolDescriptor::new("search_files", "filesystem").with_tags(["read-only"]))
//!         .with_tool(ToolDescriptor::new("write_file", "filesystem").with_tags(["write"]));
//!
//!     // Loads ~/.claw_modes/settings.json (or $CLAW_MODES_SETTINGS)
//!     let mut manager = ModeManager::from_options(
//!         Arc::new(registry),
//!         ModeManagerOptions::default(),
//!     )?;
//!
//!     for mode in manager.get_available_modes() {
//!         println!("{}: {:?}", mode.id(), mode.tools().to_vec());
//!     }
//!
//!     manager.set_current_mode("research")?;
//!     assert!(!manager.is_tool_allowed_in_current_mode("write_file"));
//!     Ok(())
//! }
//! ```
//!
//! # License
//!
//! Licensed under MIT. See LICENSE file for details.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Mode data model
///
/// This module defines [`Mode`](mode::Mode), the case-insensitive
/// [`ModeKey`](mode::ModeKey), the persisted [`ModeSettings`](mode::ModeSettings)
/// block and the read-only [`ResolvedMode`](mode::ResolvedMode) pair.
pub mod mode;

/// Tool catalog lookup
///
/// The `ToolRegistry` trait answers "which tools are in this category / carry
/// this tag". `InMemoryToolRegistry` is the bundled implementation.
pub mod registry;

/// Effective tool set computation
///
/// `resolve()` applies allow-lists, then exclusions, and returns a `ToolSet`.
pub mod resolver;

/// Built-in mode catalog
pub mod catalog;

/// Built-in mode migration
///
/// `migrate()` adds, updates and removes persisted built-in modes so they
/// match the current catalog, and reports what it changed.
pub mod migrate;

/// Settings persistence
///
/// This module provides the `ConfigStore` trait, the `JsonFileStore` and
/// `MemoryStore` implementations, and helpers that read/write only the mode
/// block of the settings document.
pub mod store;

/// Configuration options and builder
pub mod options;

/// Mode manager
///
/// This module provides `ModeManager`, which runs the start-up sequence and
/// exposes the active mode and custom mode operations.
pub mod manager;

/// Permission management for tool usage control
///
/// This module provides the `CanUseToolHandler` trait and the
/// `ModePermissionHandler` implementation backed by a resolved mode.
pub mod permissions;

/// Error types and utilities
///
/// This module defines the `ModeError` enum, which covers all error cases in the crate:
///
/// - `InvalidInput` - Blank ids and other malformed requests
/// - `NotFound` - Unknown mode id
/// - `DuplicateMode` / `BuiltInImmutable` - Conflicts
/// - `EmptyToolSet` - Modes that grant no tools
/// - `MissingDefaultMode` - Corrupted built-in catalog (fatal)
/// - `Io` / `Json` / `Store` - Settings persistence failures
pub mod error;

// Public API re-exports
pub use manager::ModeManager;
pub use resolver::resolve;

// Prelude module for common imports
pub mod prelude {
    //! Common imports for claw_modes users
    //!
    //! Use `use claw_modes::prelude::*;` to import commonly used types.

    pub use crate::catalog::BuiltInCatalog;
    pub use crate::error::ModeError;
    pub use crate::manager::ModeManager;
    pub use crate::migrate::{MigrationReport, migrate};
    pub use crate::mode::{DEFAULT_MODE_ID, Mode, ModeSettings, ResolvedMode};
    pub use crate::options::ModeManagerOptions;
    pub use crate::permissions::{CanUseToolHandler, ModePermissionHandler};
    pub use crate::registry::{InMemoryToolRegistry, ToolDescriptor, ToolRegistry};
    pub use crate::resolver::{ToolSet, resolve};
    pub use crate::store::{ConfigStore, JsonFileStore, MemoryStore};
}
