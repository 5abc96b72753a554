//! Selection state for one course.
//!
//! This module provides:
//! - The ten fixed content categories and their lazy-load state
//! - Selectable items and the snapshots captured when rows are rendered
//! - The session object that loads categories and applies checkbox inheritance
//! - Download payload construction

pub mod category;
pub mod item;
pub mod loader;
pub mod payload;
pub mod session;
pub mod tree;

pub use category::{Category, CategoryKind, LoadState};
pub use item::{Item, ItemKind, ItemMeta, ItemRow};
pub use loader::{fetch_category_items, module_items, FileIndex};
pub use payload::{build_payload, CategoryRequest, DownloadPayload};
pub use session::{CourseInfo, CourseSession};
pub use tree::{SelectionStats, SelectionTree};
