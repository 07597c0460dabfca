//! Tool-use gating by the active mode.
//!
//! Tool execution itself lives outside this crate and is usually async. This
//! module provides the seam a tool executor asks before running a tool:
//! [`CanUseToolHandler`], implemented by [`ModePermissionHandler`].
//!
//! # Architecture
//!
//! A [`ModePermissionHandler`] is a snapshot of one [`ResolvedMode`](crate::mode::ResolvedMode).
//! It evaluates requests in two layers:
//!
//! 1. **Explicit Deny** - Check disallowed_tools first (highest priority)
//! 2. **Mode Membership** - Allow only tools in the mode's resolved tool set
//!
//! Switching modes does not update existing handlers; take a fresh one from
//! [`ModeManager::permission_handler`](crate::manager::ModeManager::permission_handler).
//!
//! # Examples
//!
//! ```rust
//! use claw_modes::mode::{Mode, ResolvedMode};
//! use claw_modes::permissions::{CanUseToolHandler, ModePermissionHandler};
//! use claw_modes::resolver::ToolSet;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), claw_modes::error::ModeError> {
//! let mode = Mode::builder("review").allowed_tools(["read_file", "bash"]).build();
//! let tools: ToolSet = mode.allowed_tools.iter().collect();
//!
//! let handler = ModePermissionHandler::builder()
//!     .resolved_mode(&ResolvedMode::new(mode, tools))
//!     .disallowed_tools(vec!["bash".to_string()])
//!     .build();
//!
//! assert!(handler.can_use_tool("read_file", &json!({})).await?);
//! assert!(!handler.can_use_tool("bash", &json!({})).await?);
//! # Ok(())
//! # }
//! ```

mod handler;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ModeError;

pub use handler::{ModePermissionHandler, ModePermissionHandlerBuilder};

/// Handler for can_use_tool permission checks
///
/// Implement this trait to control which tools a host may execute. The
/// handler is asked before each tool use.
#[async_trait]
pub trait CanUseToolHandler: Send + Sync {
    /// Check if a tool should be allowed to execute
    ///
    /// # Arguments
    ///
    /// * `tool_name` - Canonical identifier of the tool being invoked
    /// * `tool_input` - Tool input parameters as JSON
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Allow tool execution
    /// * `Ok(false)` - Deny tool execution
    /// * `Err(...)` - Handler error (tool will be denied)
    async fn can_use_tool(&self, tool_name: &str, tool_input: &Value) -> Result<bool, ModeError>;
}
