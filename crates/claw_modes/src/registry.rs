//! Tool catalog lookup
//!
//! The mode resolver never knows concrete tools. It asks a [`ToolRegistry`]
//! which tools belong to a category or carry a tag. Lookups of unknown names
//! return an empty list, never an error.
//!
//! [`InMemoryToolRegistry`] is the registry used by hosts that describe their
//! tools up front.
//!
//! # Example
//!
//! ```
//! use claw_modes::registry::{InMemoryToolRegistry, ToolDescriptor, ToolRegistry};
//!
//! let mut registry = InMemoryToolRegistry::new();
//! registry.register(ToolDescriptor::new("search_files", "filesystem").with_tags(["read-only"]));
//! registry.register(ToolDescriptor::new("write_file", "filesystem").with_tags(["write"]));
//!
//! assert_eq!(registry.tools_by_category("Filesystem").len(), 2);
//! assert_eq!(registry.tools_by_tag("write")[0].name, "write_file");
//! assert!(registry.tools_by_tag("unknown").is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata describing a callable tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Canonical tool identifier
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Category the tool belongs to
    pub category: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ToolDescriptor {
    /// Create a descriptor with a name and category
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: category.into(),
            tags: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the tool carries `tag` (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Category and tag lookup over the host's tools
///
/// Implementations must be pure lookups: no mutation, no I/O. Unknown
/// categories and tags yield an empty vector.
pub trait ToolRegistry: Send + Sync {
    /// Tools belonging to `category`
    fn tools_by_category(&self, category: &str) -> Vec<ToolDescriptor>;

    /// Tools carrying `tag`
    fn tools_by_tag(&self, tag: &str) -> Vec<ToolDescriptor>;
}

/// Registry holding tool descriptors in memory
///
/// Tools are keyed by name; registering the same name twice replaces the
/// earlier descriptor. Category and tag lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolRegistry {
    /// Tools keyed by name
    tools: BTreeMap<String, ToolDescriptor>,
}

impl InMemoryToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous tool with the same name
    pub fn register(&mut self, tool: ToolDescriptor) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(mut self, tool: ToolDescriptor) -> Self {
        self.register(tool);
        self
    }

    /// Get a tool by exact name
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// All registered tools, ordered by name
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRegistry for InMemoryToolRegistry {
    fn tools_by_category(&self, category: &str) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .filter(|tool| tool.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect()
    }

    fn tools_by_tag(&self, tag: &str) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .filter(|tool| tool.has_tag(tag))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> InMemoryToolRegistry {
        InMemoryToolRegistry::new()
            .with_tool(ToolDescriptor::new("search_files", "filesystem").with_tags(["read-only"]))
            .with_tool(ToolDescriptor::new("write_file", "filesystem").with_tags(["write"]))
            .with_tool(
                ToolDescriptor::new("github_get_file", "github")
                    .with_description("Fetch a file from a repository")
                    .with_tags(["read-only", "network"]),
            )
    }

    #[test]
    fn test_register_and_get() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
        assert_eq!(
            registry.get("github_get_file").unwrap().description,
            "Fetch a file from a repository"
        );
        assert!(registry.get("GITHUB_GET_FILE").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = registry();
        registry.register(ToolDescriptor::new("write_file", "scratch"));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("write_file").unwrap().category, "scratch");
        assert_eq!(registry.tools_by_category("filesystem").len(), 1);
    }

    #[test]
    fn test_list_is_ordered_by_name() {
        let registry = registry();
        let names: Vec<_> = registry.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["github_get_file", "search_files", "write_file"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry();
        assert_eq!(registry.tools_by_category("FileSystem").len(), 2);
        assert_eq!(registry.tools_by_tag("READ-ONLY").len(), 2);
    }

    #[test]
    fn test_unknown_names_yield_empty() {
        let registry = registry();
        assert!(registry.tools_by_category("deleted").is_empty());
        assert!(registry.tools_by_tag("").is_empty());
        assert!(InMemoryToolRegistry::new().tools_by_tag("write").is_empty());
    }

    #[test]
    fn test_descriptor_deserializes_without_optional_fields() {
        let tool: ToolDescriptor =
            serde_json::from_str(r#"{"name": "fetch", "category": "web"}"#).unwrap();
        assert_eq!(tool.name, "fetch");
        assert!(tool.tags.is_empty());
        assert!(tool.description.is_empty());
    }
}
