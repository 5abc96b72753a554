//! Kind-specific item loading.

use std::collections::HashMap;

use crate::api::{CanvasApi, CanvasFile, CanvasModule, ItemId};
use crate::error::Result;
use crate::selection::category::CategoryKind;
use crate::selection::item::{Item, ItemKind, ItemMeta};

/// Course files keyed by id, prefetched once per session.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    files: HashMap<u64, CanvasFile>,
}

impl FileIndex {
    pub fn from_files(files: Vec<CanvasFile>) -> Self {
        Self {
            files: files.into_iter().map(|file| (file.id, file)).collect(),
        }
    }

    /// Look up a file by id, whether the id arrived as a number or a string.
    pub fn get(&self, id: &ItemId) -> Option<&CanvasFile> {
        self.files.get(&id.as_numeric()?)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Fetch and materialize the items of one category.
pub async fn fetch_category_items(
    api: &CanvasApi,
    course_id: u64,
    kind: CategoryKind,
    files: &FileIndex,
) -> Result<Vec<Item>> {
    tracing::debug!("Loading {} for course {}", kind, course_id);

    let items = match kind {
        CategoryKind::Files => api
            .list_files(course_id)
            .await?
            .into_iter()
            .map(|file| Item {
                id: ItemId::Numeric(file.id),
                name: file.display_name,
                kind: ItemKind::File,
                size: file.size,
                meta: ItemMeta::File { url: file.url },
            })
            .collect(),
        CategoryKind::Modules => module_items(&api.list_modules(course_id).await?, files),
        CategoryKind::Assignments => api
            .list_assignments(course_id)
            .await?
            .into_iter()
            .map(|a| Item::record(a.id, a.name, ItemKind::Assignment))
            .collect(),
        CategoryKind::Pages => api
            .list_pages(course_id)
            .await?
            .into_iter()
            .map(|p| Item::record(ItemId::Slug(p.url), p.title, ItemKind::Page))
            .collect(),
        CategoryKind::Quizzes => api
            .list_quizzes(course_id)
            .await?
            .into_iter()
            .map(|q| Item::record(q.id, q.title, ItemKind::Quiz))
            .collect(),
        CategoryKind::Discussions => api
            .list_discussions(course_id)
            .await?
            .into_iter()
            .map(|d| Item::record(d.id, d.title, ItemKind::Discussion))
            .collect(),
        CategoryKind::Announcements => api
            .list_announcements(course_id)
            .await?
            .into_iter()
            .map(|d| Item::record(d.id, d.title, ItemKind::Announcement))
            .collect(),
        CategoryKind::Grades | CategoryKind::Home | CategoryKind::Syllabus => kind
            .placeholder()
            .map(|(id, name)| Item::record(id, name, ItemKind::Special))
            .into_iter()
            .collect(),
    };

    Ok(items)
}

/// Flatten modules into selectable items.
///
/// Only File, Page and Assignment entries are kept. File sizes are joined
/// from the prefetched file index.
pub fn module_items(modules: &[CanvasModule], files: &FileIndex) -> Vec<Item> {
    let mut items = Vec::new();

    for module in modules {
        for entry in module.items() {
            let id = entry
                .content_id
                .clone()
                .unwrap_or(ItemId::Numeric(entry.id));
            let module_name = module.name.clone();

            let (kind, size, meta) = match entry.item_type.as_str() {
                "File" => (
                    ItemKind::ModuleFile,
                    files.get(&id).and_then(|file| file.size),
                    ItemMeta::ModuleFile {
                        module_name,
                        api_url: entry.url.clone(),
                    },
                ),
                "Page" => (
                    ItemKind::ModulePage,
                    None,
                    ItemMeta::ModulePage {
                        module_name,
                        page_url: entry.page_url.clone(),
                    },
                ),
                "Assignment" => (
                    ItemKind::ModuleAssignment,
                    None,
                    ItemMeta::ModuleAssignment { module_name },
                ),
                _ => continue,
            };

            items.push(Item {
                id,
                name: entry.title.clone(),
                kind,
                size,
                meta,
            });
        }
    }

    items
}
