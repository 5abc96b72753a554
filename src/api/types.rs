//! API response type definitions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a remote record.
///
/// Canvas returns numeric ids almost everywhere, but pages are addressed by
/// their URL slug and some payloads carry numeric ids as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Numeric(u64),
    Slug(String),
}

impl ItemId {
    /// Numeric value of the id, accepting digit-only strings.
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            ItemId::Numeric(id) => Some(*id),
            ItemId::Slug(slug) => slug.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Numeric(id) => write!(f, "{}", id),
            ItemId::Slug(slug) => write!(f, "{}", slug),
        }
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId::Numeric(id)
    }
}

impl From<&str> for ItemId {
    fn from(slug: &str) -> Self {
        ItemId::Slug(slug.to_string())
    }
}

/// Authenticated user, returned by `/users/self`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// User profile, returned by `/users/self/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
}

/// Course information.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: u64,
    pub name: Option<String>,
    pub course_code: Option<String>,
    pub syllabus_body: Option<String>,
}

/// A course file.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasFile {
    pub id: u64,
    pub display_name: String,
    pub size: Option<u64>,
    /// Direct download URL. Absent for locked files.
    pub url: Option<String>,
}

/// A course module with its items.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasModule {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub items: Option<Vec<ModuleItem>>,
}

impl CanvasModule {
    /// Items of this module, empty when the listing omitted them.
    pub fn items(&self) -> &[ModuleItem] {
        self.items.as_deref().unwrap_or(&[])
    }
}

/// An entry inside a module.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleItem {
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub content_id: Option<ItemId>,
    /// API URL of the underlying resource.
    pub url: Option<String>,
    pub page_url: Option<String>,
}

/// An assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub points_possible: Option<f64>,
}

/// A wiki page. List endpoints omit `body`.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiPage {
    pub url: String,
    pub title: String,
    pub body: Option<String>,
}

/// A quiz.
#[derive(Debug, Clone, Deserialize)]
pub struct Quiz {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub quiz_type: Option<String>,
}

/// A discussion topic or announcement.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionTopic {
    pub id: u64,
    pub title: String,
    pub message: Option<String>,
    pub user_name: Option<String>,
}

/// A submission of the current user.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub assignment_id: u64,
    pub score: Option<f64>,
    pub grade: Option<String>,
}
