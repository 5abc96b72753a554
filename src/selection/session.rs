//! Browsing session over one course.

use futures::future::join_all;

use crate::api::{CanvasApi, ItemId};
use crate::error::{Error, Result};
use crate::fs::course_folder_name;
use crate::selection::category::{CategoryKind, LoadState};
use crate::selection::item::Item;
use crate::selection::loader::{fetch_category_items, FileIndex};
use crate::selection::payload::{build_payload, DownloadPayload};
use crate::selection::tree::{SelectionStats, SelectionTree};

/// Basic facts about the course being browsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseInfo {
    pub id: u64,
    pub name: String,
    pub code: Option<String>,
}

impl CourseInfo {
    /// Stand-in used when course details cannot be fetched.
    pub fn fallback(id: u64) -> Self {
        Self {
            id,
            name: format!("Canvas Course {}", id),
            code: None,
        }
    }

    /// Title shown at the top of the tree.
    pub fn title(&self) -> String {
        match &self.code {
            Some(code) => format!("{} - {}", code, self.name),
            None => self.name.clone(),
        }
    }

    /// Name of the course root folder.
    pub fn folder_name(&self) -> String {
        course_folder_name(self.code.as_deref(), self.id)
    }
}

/// Everything one browsing session knows: the course, the selection tree
/// and the prefetched file listing used for module sizes.
#[derive(Debug, Clone)]
pub struct CourseSession {
    course: CourseInfo,
    tree: SelectionTree,
    files: FileIndex,
}

impl CourseSession {
    pub fn new(course: CourseInfo, files: FileIndex, default_checked: &[CategoryKind]) -> Self {
        Self {
            course,
            tree: SelectionTree::new(default_checked),
            files,
        }
    }

    /// Open a session: fetch course details and prefetch the file listing.
    ///
    /// Both lookups degrade gracefully; only an authentication failure is
    /// returned.
    pub async fn open(
        api: &CanvasApi,
        course_id: u64,
        default_checked: &[CategoryKind],
    ) -> Result<Self> {
        let course = match api.get_course(course_id).await {
            Ok(course) => CourseInfo {
                id: course_id,
                name: course
                    .name
                    .unwrap_or_else(|| format!("Canvas Course {}", course_id)),
                code: course.course_code,
            },
            Err(e) if e.is_authentication() => return Err(e),
            Err(e) => {
                tracing::warn!("Failed to fetch course {}: {}", course_id, e);
                CourseInfo::fallback(course_id)
            }
        };

        let files = match api.list_files(course_id).await {
            Ok(files) => FileIndex::from_files(files),
            Err(e) if e.is_authentication() => return Err(e),
            Err(e) => {
                tracing::warn!("Failed to pre-fetch files for size mapping: {}", e);
                FileIndex::default()
            }
        };
        tracing::debug!("Indexed {} course files", files.len());

        Ok(Self::new(course, files, default_checked))
    }

    pub fn course(&self) -> &CourseInfo {
        &self.course
    }

    pub fn tree(&self) -> &SelectionTree {
        &self.tree
    }

    /// Load a category the first time it is expanded. Later calls do nothing.
    pub async fn expand_or_check(&mut self, api: &CanvasApi, kind: CategoryKind) -> Result<()> {
        let category = self.tree.category_mut(kind);
        if *category.state() != LoadState::Unloaded {
            return Ok(());
        }
        category.begin_loading();

        let result = fetch_category_items(api, self.course.id, kind, &self.files).await;
        self.apply_load(kind, result)
    }

    /// Category checkbox click.
    ///
    /// Checking an unloaded category loads it first so its rows exist; then
    /// every rendered row is forced to `checked`.
    pub async fn toggle_category(
        &mut self,
        api: &CanvasApi,
        kind: CategoryKind,
        checked: bool,
    ) -> Result<()> {
        self.tree.category_mut(kind).set_checked(checked);

        if checked {
            self.expand_or_check(api, kind).await?;
            self.tree.category_mut(kind).set_checked(checked);
        }

        Ok(())
    }

    /// "Select all" click: toggle every category, loading the unloaded ones
    /// concurrently.
    pub async fn toggle_all(&mut self, api: &CanvasApi, checked: bool) -> Result<()> {
        for category in self.tree.categories_mut() {
            category.set_checked(checked);
        }

        if !checked {
            return Ok(());
        }

        let pending: Vec<CategoryKind> = CategoryKind::ALL
            .into_iter()
            .filter(|kind| *self.tree.category(*kind).state() == LoadState::Unloaded)
            .collect();
        for kind in &pending {
            self.tree.category_mut(*kind).begin_loading();
        }

        let course_id = self.course.id;
        let files = &self.files;
        let results = join_all(
            pending
                .iter()
                .map(|kind| fetch_category_items(api, course_id, *kind, files)),
        )
        .await;

        let mut auth_error = None;
        for (kind, result) in pending.into_iter().zip(results) {
            if let Err(e) = self.apply_load(kind, result) {
                auth_error.get_or_insert(e);
            }
            self.tree.category_mut(kind).set_checked(checked);
        }

        match auth_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Item checkbox click. Returns `false` if no row has that id.
    pub fn set_item_checked(&mut self, kind: CategoryKind, id: &ItemId, checked: bool) -> bool {
        self.tree.category_mut(kind).set_item_checked(id, checked)
    }

    pub fn selection_stats(&self) -> SelectionStats {
        self.tree.stats()
    }

    pub fn build_payload(&self) -> Result<DownloadPayload> {
        build_payload(&self.tree)
    }

    /// Record the outcome of a load. Failures mark the category as failed;
    /// authentication failures are also returned.
    fn apply_load(&mut self, kind: CategoryKind, result: Result<Vec<Item>>) -> Result<()> {
        let category = self.tree.category_mut(kind);
        match result {
            Ok(items) => {
                tracing::debug!("Loaded {} {}", items.len(), kind);
                category.finish_loading(items);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", kind, e);
                category.fail_loading(e.to_string());
                if let Error::Authentication(_) = e {
                    Err(e)
                } else {
                    Ok(())
                }
            }
        }
    }
}
