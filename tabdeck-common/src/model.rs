//! Document model: the single `State` value persisted as one unit
//!
//! A `State` holds an ordered list of tabs and the key of the active tab.
//! Each tab owns an ordered list of components. Component payloads are
//! opaque JSON values; nothing in this crate interprets them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Key of the tab created with a fresh document
pub const HOME_TAB_KEY: &str = "home";

/// One opaque UI payload owned by a tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Document-wide unique id, assigned on creation
    pub id: String,

    /// Free-form representation tag ("table", "graph", "text", ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Arbitrary payload, never interpreted by the store
    #[serde(default)]
    pub data: Value,
}

impl Component {
    /// Create a component with a freshly generated id
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            id: new_component_id(),
            kind: kind.into(),
            data,
        }
    }
}

/// Named partition of components within the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub key: String,
    pub components: Vec<Component>,
}

impl Tab {
    /// Create an empty tab
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            components: Vec::new(),
        }
    }

    /// First component with the given id, mutable
    pub fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id == id)
    }
}

/// The whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Ordered tabs; `tabs[0]` is the home (staging) tab
    pub tabs: Vec<Tab>,

    /// Key of the active tab. May dangle.
    pub active_tab_key: String,
}

impl Default for State {
    fn default() -> Self {
        Self {
            tabs: vec![Tab::new(HOME_TAB_KEY)],
            active_tab_key: HOME_TAB_KEY.to_string(),
        }
    }
}

impl State {
    /// First tab with the given key
    pub fn tab(&self, key: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.key == key)
    }

    /// First tab with the given key, mutable
    pub fn tab_mut(&mut self, key: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.key == key)
    }

    /// The home tab (`tabs[0]`), if the document has any tabs at all
    pub fn home(&self) -> Option<&Tab> {
        self.tabs.first()
    }

    /// Total number of components across all tabs
    pub fn component_count(&self) -> usize {
        self.tabs.iter().map(|t| t.components.len()).sum()
    }
}

/// Generate a new component id (UUIDv4, hyphenated)
pub fn new_component_id() -> String {
    Uuid::new_v4().to_string()
}
