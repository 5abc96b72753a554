//! Content categories and their load state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::ItemId;
use crate::selection::item::{Item, ItemRow};

/// The fixed set of content categories.
///
/// Declaration order is the order entries appear in a download payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Modules,
    Files,
    Assignments,
    Pages,
    Quizzes,
    Discussions,
    Announcements,
    Grades,
    Home,
    Syllabus,
}

impl CategoryKind {
    /// Every kind, in payload order.
    pub const ALL: [CategoryKind; 10] = [
        CategoryKind::Modules,
        CategoryKind::Files,
        CategoryKind::Assignments,
        CategoryKind::Pages,
        CategoryKind::Quizzes,
        CategoryKind::Discussions,
        CategoryKind::Announcements,
        CategoryKind::Grades,
        CategoryKind::Home,
        CategoryKind::Syllabus,
    ];

    /// Order categories are listed to the user.
    pub const DISPLAY_ORDER: [CategoryKind; 10] = [
        CategoryKind::Modules,
        CategoryKind::Files,
        CategoryKind::Assignments,
        CategoryKind::Quizzes,
        CategoryKind::Pages,
        CategoryKind::Discussions,
        CategoryKind::Announcements,
        CategoryKind::Syllabus,
        CategoryKind::Grades,
        CategoryKind::Home,
    ];

    /// Order categories are processed by a download run.
    pub const DOWNLOAD_ORDER: [CategoryKind; 10] = [
        CategoryKind::Modules,
        CategoryKind::Files,
        CategoryKind::Assignments,
        CategoryKind::Pages,
        CategoryKind::Quizzes,
        CategoryKind::Discussions,
        CategoryKind::Announcements,
        CategoryKind::Home,
        CategoryKind::Syllabus,
        CategoryKind::Grades,
    ];

    /// Position of this kind in [`CategoryKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label shown next to the category checkbox.
    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Modules => "Modules",
            CategoryKind::Files => "Files",
            CategoryKind::Assignments => "Assignments",
            CategoryKind::Pages => "Pages",
            CategoryKind::Quizzes => "Quizzes",
            CategoryKind::Discussions => "Discussions",
            CategoryKind::Announcements => "Announcements",
            CategoryKind::Grades => "Grades",
            CategoryKind::Home => "Home Page",
            CategoryKind::Syllabus => "Syllabus",
        }
    }

    /// Folder name for this category under the course root.
    pub fn folder_name(self) -> &'static str {
        match self {
            CategoryKind::Modules => "Modules",
            CategoryKind::Files => "Files",
            CategoryKind::Assignments => "Assignments",
            CategoryKind::Pages => "Pages",
            CategoryKind::Quizzes => "Quizzes",
            CategoryKind::Discussions => "Discussions",
            CategoryKind::Announcements => "Announcements",
            CategoryKind::Grades => "Grades",
            CategoryKind::Home => "Home",
            CategoryKind::Syllabus => "Syllabus",
        }
    }

    /// Fixed `(id, name)` of the single item shown for singular categories.
    pub fn placeholder(self) -> Option<(&'static str, &'static str)> {
        match self {
            CategoryKind::Grades => Some(("grades_summary", "Grades Summary")),
            CategoryKind::Home => Some(("home_page", "Home Page")),
            CategoryKind::Syllabus => Some(("syllabus_body", "Syllabus HTML")),
            _ => None,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Modules => write!(f, "modules"),
            CategoryKind::Files => write!(f, "files"),
            CategoryKind::Assignments => write!(f, "assignments"),
            CategoryKind::Pages => write!(f, "pages"),
            CategoryKind::Quizzes => write!(f, "quizzes"),
            CategoryKind::Discussions => write!(f, "discussions"),
            CategoryKind::Announcements => write!(f, "announcements"),
            CategoryKind::Grades => write!(f, "grades"),
            CategoryKind::Home => write!(f, "home"),
            CategoryKind::Syllabus => write!(f, "syllabus"),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "modules" => Ok(CategoryKind::Modules),
            "files" => Ok(CategoryKind::Files),
            "assignments" => Ok(CategoryKind::Assignments),
            "pages" => Ok(CategoryKind::Pages),
            "quizzes" => Ok(CategoryKind::Quizzes),
            "discussions" => Ok(CategoryKind::Discussions),
            "announcements" => Ok(CategoryKind::Announcements),
            "grades" => Ok(CategoryKind::Grades),
            "home" => Ok(CategoryKind::Home),
            "syllabus" => Ok(CategoryKind::Syllabus),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Lazy-load state of a category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    /// Terminal for the session; holds the message shown in place of items.
    Failed(String),
}

/// One category node of the selection tree.
#[derive(Debug, Clone)]
pub struct Category {
    kind: CategoryKind,
    checked: bool,
    state: LoadState,
    items: Vec<Item>,
    rows: Vec<ItemRow>,
}

impl Category {
    pub fn new(kind: CategoryKind, checked: bool) -> Self {
        Self {
            kind,
            checked,
            state: LoadState::Unloaded,
            items: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// State of the category-level checkbox.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Source records, as materialized by the load.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Rendered rows with their checkbox state.
    pub fn rows(&self) -> &[ItemRow] {
        &self.rows
    }

    pub(crate) fn begin_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Store loaded items and render a row for each.
    ///
    /// Rows copy the category checkbox once; they do not follow it afterwards.
    pub(crate) fn finish_loading(&mut self, items: Vec<Item>) {
        let inherit = self.checked;
        self.rows = items
            .iter()
            .map(|item| ItemRow::new(item.clone(), inherit))
            .collect();
        self.items = items;
        self.state = LoadState::Loaded;
    }

    pub(crate) fn fail_loading(&mut self, message: String) {
        self.state = LoadState::Failed(message);
    }

    /// Set the category checkbox, forcing every rendered row to match.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
        if self.is_loaded() {
            for row in &mut self.rows {
                row.checked = checked;
            }
        }
    }

    /// Set the checkbox of every row whose item has `id`.
    ///
    /// Returns `false` when no row matched.
    pub fn set_item_checked(&mut self, id: &ItemId, checked: bool) -> bool {
        let target = id.to_string();
        let mut found = false;
        for row in self
            .rows
            .iter_mut()
            .filter(|row| row.snapshot.id.to_string() == target)
        {
            row.checked = checked;
            found = true;
        }
        found
    }

    /// Snapshots of every checked row, in row order.
    pub fn checked_snapshots(&self) -> Vec<Item> {
        self.rows
            .iter()
            .filter(|row| row.checked)
            .map(|row| row.snapshot.clone())
            .collect()
    }
}
