//! Mode data model and persisted settings block
//!
//! A [`Mode`] is a declarative, named operating profile: explicit tools plus
//! category and tag allow/exclude lists. [`ModeSettings`] is the block of the
//! settings document that holds the persisted built-in modes, the user's custom
//! modes and the active mode id.
//!
//! Mode ids compare case-insensitively. All comparisons go through [`ModeKey`].
//!
//! # Example
//!
//! ```
//! use claw_modes::mode::Mode;
//!
//! let mode = Mode::builder("Reviewer")
//!     .name("Code reviewer")
//!     .allowed_tools(["read_file", "READ_FILE", "search_files"])
//!     .excluded_tags(["write"])
//!     .build();
//!
//! // Explicit tools are deduplicated case-insensitively, first spelling wins
//! assert_eq!(mode.allowed_tools, vec!["read_file", "search_files"]);
//! assert!(mode.matches_id("reviewer"));
//! assert!(!mode.is_built_in);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::catalog::BuiltInCatalog;
use crate::resolver::ToolSet;

/// Id of the built-in mode every installation must carry
pub const DEFAULT_MODE_ID: &str = "default";

/// Case-insensitive comparison key for mode ids
///
/// Built from a raw id by trimming surrounding whitespace and lower-casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModeKey(String);

impl ModeKey {
    /// Build the key for a raw mode id
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_lowercase())
    }

    /// Whether the id was empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// The normalized key text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModeKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named profile that determines which tools are callable
///
/// The resolved tool set is never stored here; see [`ResolvedMode`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mode {
    /// Unique id, compared case-insensitively
    pub id: String,
    /// Display name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// System prompt used while the mode is active
    pub system_prompt: String,
    /// Preferred model identifier
    pub preferred_model: String,
    /// Explicitly allowed tool identifiers
    pub allowed_tools: Vec<String>,
    /// Categories whose tools are allowed
    pub allowed_categories: Vec<String>,
    /// Categories whose tools are removed
    pub excluded_categories: Vec<String>,
    /// Tags whose tools are allowed
    pub allowed_tags: Vec<String>,
    /// Tags whose tools are removed
    pub excluded_tags: Vec<String>,
    /// Shipped with the software and maintained by migration
    pub is_built_in: bool,
}

impl Mode {
    /// Create a new mode builder
    pub fn builder(id: impl Into<String>) -> ModeBuilder {
        ModeBuilder {
            inner: Mode {
                id: id.into(),
                ..Mode::default()
            },
        }
    }

    /// Case-insensitive key for this mode's id
    pub fn key(&self) -> ModeKey {
        ModeKey::new(&self.id)
    }

    /// Whether `id` names this mode (case-insensitive)
    pub fn matches_id(&self, id: &str) -> bool {
        self.key() == ModeKey::new(id)
    }

    /// Whether the mode has no allow-list at all
    ///
    /// Such a mode always resolves to an empty tool set.
    pub fn has_no_grants(&self) -> bool {
        self.allowed_tools.is_empty()
            && self.allowed_categories.is_empty()
            && self.allowed_tags.is_empty()
    }

    /// Canonicalize the mode
    ///
    /// Trims the id, drops blank entries, deduplicates `allowed_tools`
    /// case-insensitively (first spelling wins) and the category/tag
    /// collections exactly.
    pub fn normalize(mut self) -> Self {
        self.id = self.id.trim().to_string();
        self.allowed_tools = dedup_ignore_case(self.allowed_tools);
        self.allowed_categories = dedup_exact(self.allowed_categories);
        self.excluded_categories = dedup_exact(self.excluded_categories);
        self.allowed_tags = dedup_exact(self.allowed_tags);
        self.excluded_tags = dedup_exact(self.excluded_tags);
        self
    }
}

fn dedup_ignore_case(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && seen.insert(item.to_lowercase()))
        .collect()
}

fn dedup_exact(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}

fn strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Builder for [`Mode`]
///
/// `build()` returns a normalized mode. User-facing modes are never built-in
/// unless [`ModeBuilder::built_in`] is called.
#[derive(Debug, Default)]
pub struct ModeBuilder {
    inner: Mode,
}

impl ModeBuilder {
    /// Set display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Set description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = description.into();
        self
    }

    /// Set system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.inner.system_prompt = prompt.into();
        self
    }

    /// Set preferred model
    pub fn preferred_model(mut self, model: impl Into<String>) -> Self {
        self.inner.preferred_model = model.into();
        self
    }

    /// Set explicitly allowed tools
    pub fn allowed_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.allowed_tools = strings(tools);
        self
    }

    /// Set allowed categories
    pub fn allowed_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.allowed_categories = strings(categories);
        self
    }

    /// Set excluded categories
    pub fn excluded_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.excluded_categories = strings(categories);
        self
    }

    /// Set allowed tags
    pub fn allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.allowed_tags = strings(tags);
        self
    }

    /// Set excluded tags
    pub fn excluded_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.excluded_tags = strings(tags);
        self
    }

    /// Flag the mode as built-in
    pub fn built_in(mut self, built_in: bool) -> Self {
        self.inner.is_built_in = built_in;
        self
    }

    /// Build the (normalized) mode
    pub fn build(self) -> Mode {
        self.inner.normalize()
    }
}

/// The mode block of the persisted settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModeSettings {
    /// Built-in modes as last persisted
    pub default_modes: Vec<Mode>,
    /// User-defined modes
    pub custom_modes: Vec<Mode>,
    /// Id of the currently selected mode
    pub active_mode_id: String,
    /// Built-in catalog version the default modes were last migrated to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_version: Option<String>,
}

impl ModeSettings {
    /// Fresh settings for a first run: the whole catalog, no custom modes,
    /// `"default"` active.
    pub fn seeded(catalog: &BuiltInCatalog) -> Self {
        Self {
            default_modes: catalog.modes().to_vec(),
            custom_modes: Vec::new(),
            active_mode_id: DEFAULT_MODE_ID.to_string(),
            catalog_version: Some(catalog.version().to_string()),
        }
    }

    /// All modes, built-ins first, each group in stored order
    pub fn all_modes(&self) -> impl Iterator<Item = &Mode> {
        self.default_modes.iter().chain(self.custom_modes.iter())
    }

    /// Look up any mode by id (case-insensitive)
    pub fn find(&self, id: &str) -> Option<&Mode> {
        let key = ModeKey::new(id);
        self.all_modes().find(|mode| mode.key() == key)
    }

    /// Look up a built-in (default) mode by id
    pub fn find_default(&self, id: &str) -> Option<&Mode> {
        let key = ModeKey::new(id);
        self.default_modes.iter().find(|mode| mode.key() == key)
    }

    /// Position of a custom mode by id
    pub fn custom_position(&self, id: &str) -> Option<usize> {
        let key = ModeKey::new(id);
        self.custom_modes.iter().position(|mode| mode.key() == key)
    }

    /// Whether any mode carries this id
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}

/// A mode paired with its freshly resolved tool set
///
/// The pair is read-only and valid only for the retrieval that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMode {
    mode: Mode,
    tools: ToolSet,
}

impl ResolvedMode {
    /// Pair a mode with its resolved tools
    pub fn new(mode: Mode, tools: ToolSet) -> Self {
        Self { mode, tools }
    }

    /// The mode definition
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// The mode id
    pub fn id(&self) -> &str {
        &self.mode.id
    }

    /// The resolved tool set
    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Exact (case-sensitive) membership check
    pub fn is_tool_allowed(&self, tool_name: &str) -> bool {
        self.tools.contains(tool_name)
    }

    /// Split into the mode and its tool set
    pub fn into_parts(self) -> (Mode, ToolSet) {
        (self.mode, self.tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_key_is_case_and_whitespace_insensitive() {
        assert_eq!(ModeKey::new("  Default "), ModeKey::new("default"));
        assert_eq!(ModeKey::from("RESEARCH").as_str(), "research");
        assert!(ModeKey::new("   ").is_blank());
    }

    #[test]
    fn test_builder_normalizes() {
        let mode = Mode::builder("  writer ")
            .allowed_tools(["Edit", "edit", " ", "Read"])
            .allowed_tags(["fs", "fs", "FS"])
            .build();

        assert_eq!(mode.id, "writer");
        assert_eq!(mode.allowed_tools, vec!["Edit", "Read"]);
        // Tags are deduplicated exactly, not case-insensitively
        assert_eq!(mode.allowed_tags, vec!["fs", "FS"]);
    }

    #[test]
    fn test_has_no_grants() {
        let empty = Mode::builder("empty").excluded_tags(["write"]).build();
        assert!(empty.has_no_grants());

        let tagged = Mode::builder("tagged").allowed_tags(["read"]).build();
        assert!(!tagged.has_no_grants());
    }

    #[test]
    fn test_mode_serializes_camel_case() {
        let mode = Mode::builder("default")
            .system_prompt("be helpful")
            .preferred_model("fast-model")
            .allowed_categories(["filesystem"])
            .built_in(true)
            .build();

        let value = serde_json::to_value(&mode).unwrap();
        assert_eq!(value["systemPrompt"], "be helpful");
        assert_eq!(value["preferredModel"], "fast-model");
        assert_eq!(value["allowedCategories"], json!(["filesystem"]));
        assert_eq!(value["isBuiltIn"], true);
    }

    #[test]
    fn test_mode_deserializes_with_missing_fields() {
        let mode: Mode = serde_json::from_value(json!({ "name": "no id" })).unwrap();
        assert!(mode.key().is_blank());
        assert!(mode.allowed_tools.is_empty());
        assert!(!mode.is_built_in);
    }

    #[test]
    fn test_settings_lookup_prefers_built_ins() {
        let settings = ModeSettings {
            default_modes: vec![Mode::builder("default").built_in(true).build()],
            custom_modes: vec![Mode::builder("mine").build()],
            active_mode_id: "default".to_string(),
            catalog_version: None,
        };

        assert!(settings.find("DEFAULT").unwrap().is_built_in);
        assert_eq!(settings.find("Mine").unwrap().id, "mine");
        assert_eq!(settings.custom_position("MINE"), Some(0));
        assert!(settings.find_default("mine").is_none());
        assert!(!settings.contains("other"));

        let ids: Vec<_> = settings.all_modes().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["default", "mine"]);
    }

    #[test]
    fn test_settings_round_trip_through_json_keys() {
        let value = json!({
            "defaultModes": [{ "id": "default", "allowedTools": ["a"], "isBuiltIn": true }],
            "customModes": [],
            "activeModeId": "default"
        });
        let settings: ModeSettings = serde_json::from_value(value).unwrap();
        assert_eq!(settings.default_modes.len(), 1);
        assert_eq!(settings.active_mode_id, "default");
        assert!(settings.catalog_version.is_none());

        let back = serde_json::to_value(&settings).unwrap();
        assert!(back.get("catalogVersion").is_none());
    }
}
