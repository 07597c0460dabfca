//! Custom modes and built-in upgrades, persisted to a JSON settings file.
//!
//! This example demonstrates:
//! - `ModeManager::from_options()` with an explicit settings path
//! - Adding and removing custom modes
//! - The migration report produced when a newer built-in catalog ships
//!
//! ## Run
//! ```sh
//! cargo run -p demos --example custom_modes
//! ```

use claw_modes::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

fn registry() -> Arc<InMemoryToolRegistry> {
    Arc::new(
        InMemoryToolRegistry::new()
            .with_tool(ToolDescriptor::new("read_file", "filesystem").with_tags(["read-only"]))
            .with_tool(ToolDescriptor::new("write_file", "filesystem").with_tags(["write"]))
            .with_tool(ToolDescriptor::new("run_tests", "shell").with_tags(["exec"]))
            .with_tool(ToolDescriptor::new("fetch_url", "web").with_tags(["read-only"])),
    )
}

/// A later release: drops `code`, adds `review`, keeps the rest
fn next_catalog() -> Result<BuiltInCatalog, ModeError> {
    let mut modes: Vec<Mode> = BuiltInCatalog::current()
        .modes()
        .iter()
        .filter(|m| m.id != "code")
        .cloned()
        .collect();
    modes.push(
        Mode::builder("review")
            .name("Review")
            .description("Read code and fetch references, never write")
            .allowed_tags(["read-only"])
            .build(),
    );
    BuiltInCatalog::new(semver::Version::new(2, 0, 0), modes)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claw_modes=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let dir: PathBuf =
        std::env::temp_dir().join(format!("claw_modes_demo_{}", uuid::Uuid::new_v4()));
    let path = dir.join("settings.json");
    println!("Settings file: {}\n", path.display());

    // --- First start: seed built-ins, add a custom mode ---
    let options = ModeManagerOptions::builder().settings_path(&path).build();
    let mut manager = ModeManager::from_options(registry(), options)?;

    let tester = Mode::builder("tester")
        .name("Tester")
        .allowed_tools(["run_tests"])
        .allowed_tags(["read-only"])
        .excluded_categories(["web"])
        .build();
    let added = manager.add_custom_mode(tester)?;
    println!("Added {}: {:?}", added.id(), added.tools().to_vec());

    // Grants nothing in this registry, so it is rejected
    let empty = Mode::builder("ghost").allowed_categories(["database"]).build();
    if let Err(e) = manager.add_custom_mode(empty) {
        println!("Rejected ghost: {}", e);
    }

    manager.set_current_mode("tester")?;

    // --- Second start with a newer catalog ---
    let options = ModeManagerOptions::builder()
        .settings_path(&path)
        .catalog(next_catalog()?)
        .build();
    let mut manager = ModeManager::from_options(registry(), options)?;

    println!("\nMigration: {}", manager.last_migration());
    println!("Active mode survived restart: {}", manager.current_mode_id());
    for mode in manager.get_available_modes() {
        let kind = if mode.mode().is_built_in { "built-in" } else { "custom" };
        println!("  {:<8} ({}) {:?}", mode.id(), kind, mode.tools().to_vec());
    }

    // --- Clean up the custom mode ---
    let removed = manager.remove_custom_mode("tester")?;
    println!("\nRemoved {}, active mode is now {}", removed.id, manager.current_mode_id());

    if let Err(e) = manager.remove_custom_mode("default") {
        println!("Cannot remove default: {}", e);
    }

    println!("\n{}", std::fs::read_to_string(&path)?);
    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
