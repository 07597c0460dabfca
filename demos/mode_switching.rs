//! Mode switching: list the built-in modes and gate tool calls by the active one.
//!
//! This example demonstrates:
//! - `ModeManager::get_available_modes()` with each mode's resolved tools
//! - `set_current_mode()` and `is_tool_allowed_in_current_mode()`
//! - `ModePermissionHandler` as a `CanUseToolHandler` for an async executor
//!
//! ## Run
//! ```sh
//! RUST_LOG=claw_modes=debug cargo run -p demos --example mode_switching
//! ```

use claw_modes::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn registry() -> InMemoryToolRegistry {
    InMemoryToolRegistry::new()
        .with_tool(ToolDescriptor::new("search_files", "filesystem").with_tags(["read-only"]))
        .with_tool(ToolDescriptor::new("read_file", "filesystem").with_tags(["read-only"]))
        .with_tool(ToolDescriptor::new("write_file", "filesystem").with_tags(["write"]))
        .with_tool(ToolDescriptor::new("github_get_file", "github").with_tags(["read-only"]))
        .with_tool(ToolDescriptor::new("github_create_pr", "github").with_tags(["write"]))
        .with_tool(ToolDescriptor::new("fetch_url", "web").with_tags(["read-only", "network"]))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claw_modes=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    // Settings live in memory here; see custom_modes for a JSON file
    let store = Arc::new(MemoryStore::new());
    let mut manager = ModeManager::new(Arc::new(registry()), store.clone())?;

    println!("=== Available Modes ===\n");
    for mode in manager.get_available_modes() {
        println!("{:<10} {:?}", mode.id(), mode.tools().to_vec());
    }

    println!("\nActive mode: {}", manager.current_mode_id());

    // --- Switch and check tools ---
    println!("\n=== Switching to research ===\n");
    manager.set_current_mode("research")?;

    for tool in ["read_file", "write_file", "github_create_pr", "fetch_url"] {
        let verdict = if manager.is_tool_allowed_in_current_mode(tool) {
            "ALLOW"
        } else {
            "DENY "
        };
        println!("  [{}] {}", verdict, tool);
    }

    // --- Async gate for a tool executor ---
    println!("\n=== Permission handler ===\n");
    let handler: Box<dyn CanUseToolHandler> = Box::new(manager.permission_handler()?);
    let input = json!({ "path": "README.md" });
    println!(
        "  read_file  -> {}",
        handler.can_use_tool("read_file", &input).await?
    );
    println!(
        "  write_file -> {}",
        handler.can_use_tool("write_file", &input).await?
    );

    // Unknown ids leave the active mode untouched
    if let Err(e) = manager.set_current_mode("no-such-mode") {
        println!("\nSwitch failed: {}", e);
    }
    println!("Still in: {}", manager.current_mode_id());

    println!("\nSettings saved {} time(s)", store.save_count());
    Ok(())
}
