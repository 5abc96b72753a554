//! Download payload construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::selection::category::{CategoryKind, LoadState};
use crate::selection::item::Item;
use crate::selection::tree::SelectionTree;

/// What to download from one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "UPPERCASE")]
pub enum CategoryRequest {
    /// Everything the category holds, enumerated at download time.
    All,
    /// Exactly these snapshots.
    Select { items: Vec<Item> },
}

/// Download request keyed by category kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadPayload {
    entries: BTreeMap<CategoryKind, CategoryRequest>,
}

impl DownloadPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: CategoryKind, request: CategoryRequest) {
        self.entries.insert(kind, request);
    }

    pub fn get(&self, kind: CategoryKind) -> Option<&CategoryRequest> {
        self.entries.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in payload order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryKind, &CategoryRequest)> {
        self.entries.iter().map(|(kind, request)| (*kind, request))
    }
}

/// Build a payload from the tree's checkbox state.
///
/// - checked and not loaded: `ALL`
/// - loaded: `SELECT` with the checked snapshots, or nothing if none are checked
/// - unchecked and not loaded: nothing
pub fn build_payload(tree: &SelectionTree) -> Result<DownloadPayload> {
    let mut payload = DownloadPayload::new();

    for kind in CategoryKind::ALL {
        let category = tree.category(kind);

        match category.state() {
            LoadState::Loaded => {
                let items = category.checked_snapshots();
                if !items.is_empty() {
                    payload.insert(kind, CategoryRequest::Select { items });
                }
            }
            LoadState::Unloaded | LoadState::Loading | LoadState::Failed(_) => {
                if category.is_checked() {
                    payload.insert(kind, CategoryRequest::All);
                }
            }
        }
    }

    if payload.is_empty() {
        return Err(Error::EmptySelection);
    }

    Ok(payload)
}
