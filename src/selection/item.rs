//! Selectable items.

use serde::{Deserialize, Serialize};

use crate::api::ItemId;

/// Kind of a selectable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    File,
    Assignment,
    Page,
    Quiz,
    Discussion,
    Announcement,
    /// Placeholder for grades, home page and syllabus.
    Special,
    ModuleFile,
    ModulePage,
    ModuleAssignment,
}

/// Kind-specific data an item needs at download time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemMeta {
    /// Course file with its direct content URL.
    File { url: Option<String> },
    /// File inside a module; `api_url` must be resolved to get the content URL.
    ModuleFile {
        module_name: String,
        api_url: Option<String>,
    },
    /// Page inside a module.
    ModulePage {
        module_name: String,
        page_url: Option<String>,
    },
    /// Assignment inside a module.
    ModuleAssignment { module_name: String },
    /// Rendered to a document from its full record.
    Record,
}

/// A selectable unit within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub meta: ItemMeta,
}

impl Item {
    /// Item without kind-specific data.
    pub fn record(id: impl Into<ItemId>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            size: None,
            meta: ItemMeta::Record,
        }
    }

    /// Name of the owning module, for module items.
    pub fn module_name(&self) -> Option<&str> {
        match &self.meta {
            ItemMeta::ModuleFile { module_name, .. }
            | ItemMeta::ModulePage { module_name, .. }
            | ItemMeta::ModuleAssignment { module_name } => Some(module_name.as_str()),
            ItemMeta::File { .. } | ItemMeta::Record => None,
        }
    }
}

/// A rendered item row.
///
/// `snapshot` is a copy of the item taken when the row was rendered and is
/// what ends up in a download payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub snapshot: Item,
    pub checked: bool,
}

impl ItemRow {
    pub fn new(snapshot: Item, checked: bool) -> Self {
        Self { snapshot, checked }
    }
}
