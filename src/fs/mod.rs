//! Filesystem module.
//!
//! Provides:
//! - Path segment sanitization
//! - Destination path construction

pub mod naming;
pub mod paths;

pub use naming::{sanitize, sanitize_or};
pub use paths::{category_path, course_folder_name, document_path, module_path};
