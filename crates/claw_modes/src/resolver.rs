//! Effective tool set computation
//!
//! [`resolve`] turns a [`Mode`] into the concrete set of tool identifiers it
//! grants, against the live [`ToolRegistry`]:
//!
//! 1. **Explicit tools** - `allowed_tools` seed the set
//! 2. **Allowed categories** - every tool in each category is added
//! 3. **Allowed tags** - every tool carrying each tag is added
//! 4. **Excluded categories** - every tool in each category is removed
//! 5. **Excluded tags** - every tool carrying each tag is removed
//!
//! Exclusions run after all inclusions, so exclusion always wins. Resolution
//! has no side effects and performs no I/O.
//!
//! # Example
//!
//! ```
//! use claw_modes::mode::Mode;
//! use claw_modes::registry::{InMemoryToolRegistry, ToolDescriptor};
//! use claw_modes::resolver::resolve;
//!
//! let registry = InMemoryToolRegistry::new()
//!     .with_tool(ToolDescriptor::new("read_file", "filesystem"))
//!     .with_tool(ToolDescriptor::new("write_file", "filesystem").with_tags(["write"]));
//!
//! let mode = Mode::builder("readonly")
//!     .allowed_categories(["filesystem"])
//!     .excluded_tags(["write"])
//!     .build();
//!
//! let tools = resolve(&mode, &registry);
//! assert!(tools.contains("read_file"));
//! assert!(!tools.contains("write_file"));
//! ```

use std::collections::BTreeMap;

use crate::mode::Mode;
use crate::registry::{ToolDescriptor, ToolRegistry};

/// Set of tool identifiers, keyed case-insensitively
///
/// The first spelling inserted for a key is kept as the canonical name.
/// [`ToolSet::contains`] is exact: callers pass canonical identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSet {
    /// lower-cased name -> canonical name
    tools: BTreeMap<String, String>,
}

impl ToolSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tool; returns false if the name (case-insensitive) was present
    pub fn insert(&mut self, name: &str) -> bool {
        let key = name.to_lowercase();
        if self.tools.contains_key(&key) {
            return false;
        }
        self.tools.insert(key, name.to_string());
        true
    }

    /// Remove a tool by name (case-insensitive)
    pub fn remove(&mut self, name: &str) -> bool {
        self.tools.remove(&name.to_lowercase()).is_some()
    }

    /// Exact membership check
    pub fn contains(&self, name: &str) -> bool {
        self.tools
            .get(&name.to_lowercase())
            .is_some_and(|canonical| canonical == name)
    }

    /// Case-insensitive membership check
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.tools.contains_key(&name.to_lowercase())
    }

    /// Number of tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Canonical names, sorted case-insensitively
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tools.values().map(String::as_str)
    }

    /// Canonical names as an owned, sorted list
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ToolSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ToolSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// Compute the effective tool set of `mode`
///
/// A mode with no allow-lists resolves to an empty set; callers that persist
/// or activate modes must reject that themselves.
pub fn resolve(mode: &Mode, registry: &dyn ToolRegistry) -> ToolSet {
    let mut tools: ToolSet = mode.allowed_tools.iter().collect();

    for category in &mode.allowed_categories {
        add_all(&mut tools, registry.tools_by_category(category));
    }
    for tag in &mode.allowed_tags {
        add_all(&mut tools, registry.tools_by_tag(tag));
    }

    // Exclusions strictly after inclusions
    for category in &mode.excluded_categories {
        remove_all(&mut tools, registry.tools_by_category(category));
    }
    for tag in &mode.excluded_tags {
        remove_all(&mut tools, registry.tools_by_tag(tag));
    }

    tools
}

fn add_all(tools: &mut ToolSet, descriptors: Vec<ToolDescriptor>) {
    for descriptor in descriptors {
        tools.insert(&descriptor.name);
    }
}

fn remove_all(tools: &mut ToolSet, descriptors: Vec<ToolDescriptor>) {
    for descriptor in descriptors {
        tools.remove(&descriptor.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryToolRegistry;

    fn registry() -> InMemoryToolRegistry {
        InMemoryToolRegistry::new()
            .with_tool(ToolDescriptor::new("c", "X"))
            .with_tool(ToolDescriptor::new("d", "X").with_tags(["net"]))
            .with_tool(ToolDescriptor::new("a", "Y").with_tags(["net", "write"]))
            .with_tool(ToolDescriptor::new("e", "Z").with_tags(["write"]))
    }

    #[test]
    fn test_explicit_tools_only() {
        let mode = Mode::builder("m").allowed_tools(["a", "b"]).build();
        let tools = resolve(&mode, &InMemoryToolRegistry::new());
        assert_eq!(tools.to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_category_without_explicit_tools() {
        let mode = Mode::builder("m").allowed_categories(["X"]).build();
        let tools = resolve(&mode, &registry());
        assert_eq!(tools.to_vec(), vec!["c", "d"]);
    }

    #[test]
    fn test_tags_union_with_categories() {
        let mode = Mode::builder("m")
            .allowed_categories(["X"])
            .allowed_tags(["write"])
            .build();
        let tools = resolve(&mode, &registry());
        assert_eq!(tools.to_vec(), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_exclusion_wins_over_explicit_tool() {
        let registry = InMemoryToolRegistry::new().with_tool(ToolDescriptor::new("a", "X"));
        let mode = Mode::builder("m")
            .allowed_tools(["a"])
            .excluded_categories(["X"])
            .build();
        assert!(resolve(&mode, &registry).is_empty());
    }

    #[test]
    fn test_excluded_tag_removes_tools_added_by_category() {
        let mode = Mode::builder("m")
            .allowed_categories(["X", "Y"])
            .excluded_tags(["net"])
            .build();
        let tools = resolve(&mode, &registry());
        assert_eq!(tools.to_vec(), vec!["c"]);
    }

    #[test]
    fn test_exclusion_is_case_insensitive_on_names() {
        let registry = InMemoryToolRegistry::new().with_tool(ToolDescriptor::new("Edit", "X"));
        let mode = Mode::builder("m")
            .allowed_tools(["edit", "read"])
            .excluded_categories(["X"])
            .build();
        assert_eq!(resolve(&mode, &registry).to_vec(), vec!["read"]);
    }

    #[test]
    fn test_unknown_category_contributes_nothing() {
        let mode = Mode::builder("m")
            .allowed_tools(["b"])
            .allowed_categories(["deleted"])
            .excluded_tags(["gone"])
            .build();
        assert_eq!(resolve(&mode, &registry()).to_vec(), vec!["b"]);
    }

    #[test]
    fn test_no_allow_lists_resolves_empty() {
        let mode = Mode::builder("m").excluded_categories(["X"]).build();
        assert!(resolve(&mode, &registry()).is_empty());
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let registry = registry();
        let mode = Mode::builder("m").allowed_tags(["net"]).build();
        assert_eq!(resolve(&mode, &registry), resolve(&mode, &registry));
    }

    #[test]
    fn test_tool_set_contains_is_exact() {
        let tools: ToolSet = ["Read", "read", "Grep"].into_iter().collect();
        assert_eq!(tools.len(), 2);
        assert!(tools.contains("Read"));
        assert!(!tools.contains("read"));
        assert!(tools.contains_ignore_case("READ"));
        assert!(!tools.contains("Bash"));
    }

    #[test]
    fn test_tool_set_insert_remove() {
        let mut tools = ToolSet::new();
        assert!(tools.insert("Bash"));
        assert!(!tools.insert("bash"));
        assert!(tools.remove("BASH"));
        assert!(!tools.remove("bash"));
        assert!(tools.is_empty());
    }
}
