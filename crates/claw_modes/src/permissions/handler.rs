//! Mode-backed permission handler implementation.

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use super::CanUseToolHandler;
use crate::error::ModeError;
use crate::mode::ResolvedMode;
use crate::resolver::ToolSet;

/// Permission handler backed by a resolved mode.
///
/// This handler evaluates tool usage requests through two layers:
///
/// 1. **Explicit Deny** - Check disallowed_tools first (highest priority)
/// 2. **Mode Membership** - Exact match against the mode's resolved tools
///
/// A handler built without a mode denies everything.
#[derive(Debug, Clone, Default)]
pub struct ModePermissionHandler {
    mode_id: Option<String>,
    allowed: ToolSet,
    disallowed_tools: Vec<String>,
}

impl ModePermissionHandler {
    /// Create a new builder for configuring the handler.
    pub fn builder() -> ModePermissionHandlerBuilder {
        ModePermissionHandlerBuilder::default()
    }

    /// Handler allowing exactly the tools of `mode`
    pub fn for_mode(mode: &ResolvedMode) -> Self {
        Self::builder().resolved_mode(mode).build()
    }

    /// Id of the mode this handler was built from
    pub fn mode_id(&self) -> Option<&str> {
        self.mode_id.as_deref()
    }

    fn is_denied(&self, tool_name: &str) -> bool {
        self.disallowed_tools.iter().any(|t| t == tool_name)
    }

    /// Synchronous form of [`CanUseToolHandler::can_use_tool`]
    pub fn is_allowed(&self, tool_name: &str) -> bool {
        !self.is_denied(tool_name) && self.allowed.contains(tool_name)
    }
}

#[async_trait]
impl CanUseToolHandler for ModePermissionHandler {
    async fn can_use_tool(&self, tool_name: &str, _tool_input: &Value) -> Result<bool, ModeError> {
        let allowed = self.is_allowed(tool_name);
        trace!(tool = tool_name, mode = ?self.mode_id, allowed, "tool permission check");
        Ok(allowed)
    }
}

/// Builder for [`ModePermissionHandler`].
#[derive(Debug, Default)]
pub struct ModePermissionHandlerBuilder {
    mode_id: Option<String>,
    allowed: ToolSet,
    disallowed_tools: Vec<String>,
}

impl ModePermissionHandlerBuilder {
    /// Allow the tools of a resolved mode.
    pub fn resolved_mode(mut self, mode: &ResolvedMode) -> Self {
        self.mode_id = Some(mode.id().to_string());
        self.allowed = mode.tools().clone();
        self
    }

    /// Set the list of disallowed tools.
    pub fn disallowed_tools(mut self, tools: Vec<String>) -> Self {
        self.disallowed_tools = tools;
        self
    }

    /// Build the permission handler.
    pub fn build(self) -> ModePermissionHandler {
        ModePermissionHandler {
            mode_id: self.mode_id,
            allowed: self.allowed,
            disallowed_tools: self.disallowed_tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use serde_json::json;

    fn resolved(id: &str, tools: &[&str]) -> ResolvedMode {
        let mode = Mode::builder(id).allowed_tools(tools.iter().copied()).build();
        let set: ToolSet = tools.iter().collect();
        ResolvedMode::new(mode, set)
    }

    #[tokio::test]
    async fn test_mode_tools_allowed() {
        let handler = ModePermissionHandler::for_mode(&resolved("research", &["read", "grep"]));

        assert!(handler.can_use_tool("read", &Value::Null).await.unwrap());
        assert!(handler.can_use_tool("grep", &Value::Null).await.unwrap());
        assert!(!handler.can_use_tool("write", &Value::Null).await.unwrap());
        assert_eq!(handler.mode_id(), Some("research"));
    }

    #[tokio::test]
    async fn test_membership_is_case_sensitive() {
        let handler = ModePermissionHandler::for_mode(&resolved("m", &["Read"]));

        assert!(handler.can_use_tool("Read", &Value::Null).await.unwrap());
        assert!(!handler.can_use_tool("read", &Value::Null).await.unwrap());
    }

    #[tokio::test]
    async fn test_explicit_deny_beats_mode() {
        let handler = ModePermissionHandler::builder()
            .resolved_mode(&resolved("default", &["bash", "read"]))
            .disallowed_tools(vec!["bash".to_string()])
            .build();

        assert!(!handler.can_use_tool("bash", &Value::Null).await.unwrap());
        assert!(handler.can_use_tool("read", &Value::Null).await.unwrap());
    }

    #[tokio::test]
    async fn test_builder_defaults_deny_all() {
        let handler = ModePermissionHandler::builder().build();

        assert!(!handler.can_use_tool("bash", &Value::Null).await.unwrap());
        assert!(handler.mode_id().is_none());
    }

    #[tokio::test]
    async fn test_tool_input_parameter_ignored() {
        let handler = ModePermissionHandler::for_mode(&resolved("m", &["bash"]));
        let complex_input = json!({
            "command": "rm -rf /",
            "dangerous": true
        });

        assert!(handler.can_use_tool("bash", &complex_input).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_use_tool_trait_object() {
        let handler: Box<dyn CanUseToolHandler> =
            Box::new(ModePermissionHandler::for_mode(&resolved("m", &["read"])));

        let result = handler.can_use_tool("read", &json!({})).await;
        assert!(result.unwrap());
    }

    #[test]
    fn test_sync_check_matches_async() {
        let handler = ModePermissionHandler::for_mode(&resolved("m", &["read"]));
        assert!(handler.is_allowed("read"));
        assert!(!handler.is_allowed("write"));
    }
}
