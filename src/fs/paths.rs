//! Destination path construction.

use std::path::PathBuf;

use crate::fs::naming::sanitize_or;
use crate::selection::CategoryKind;

/// Name of the course root folder: the sanitized course code, or
/// `Canvas_Course_<id>` when no usable code is known.
pub fn course_folder_name(course_code: Option<&str>, course_id: u64) -> String {
    let fallback = format!("Canvas_Course_{}", course_id);
    match course_code {
        Some(code) => sanitize_or(code, &fallback),
        None => fallback,
    }
}

/// `<root>/<category folder>/<name>`
pub fn category_path(root: &str, kind: CategoryKind, name: &str) -> PathBuf {
    PathBuf::from(root)
        .join(kind.folder_name())
        .join(sanitize_or(name, "Untitled"))
}

/// `<root>/<category folder>/<name>.html`
pub fn document_path(root: &str, kind: CategoryKind, name: &str) -> PathBuf {
    PathBuf::from(root)
        .join(kind.folder_name())
        .join(format!("{}.html", sanitize_or(name, "Untitled")))
}

/// `<root>/Modules/<module>/<name>`
pub fn module_path(root: &str, module_name: &str, name: &str) -> PathBuf {
    PathBuf::from(root)
        .join(CategoryKind::Modules.folder_name())
        .join(sanitize_or(module_name, "Module"))
        .join(sanitize_or(name, "Untitled"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_folder_name() {
        assert_eq!(course_folder_name(Some("CS2040S"), 1), "CS2040S");
        assert_eq!(course_folder_name(Some("CS1010/E"), 1), "CS1010_E");
        assert_eq!(course_folder_name(None, 4521), "Canvas_Course_4521");
        assert_eq!(course_folder_name(Some("  "), 7), "Canvas_Course_7");
    }

    #[test]
    fn test_course_folder_name_stays_inside_download_dir() {
        assert_eq!(course_folder_name(Some(".."), 9), "Canvas_Course_9");
        assert_eq!(course_folder_name(Some("."), 9), "Canvas_Course_9");
        assert_eq!(course_folder_name(Some(" .. "), 9), "Canvas_Course_9");
        assert_eq!(course_folder_name(Some("../x"), 9), ".._x");
    }

    #[test]
    fn test_category_paths() {
        assert_eq!(
            category_path("CS2040S", CategoryKind::Files, "a:b.pdf"),
            PathBuf::from("CS2040S/Files/a_b.pdf")
        );
        assert_eq!(
            document_path("CS2040S", CategoryKind::Announcements, "Exam?"),
            PathBuf::from("CS2040S/Announcements/Exam_.html")
        );
    }

    #[test]
    fn test_module_path() {
        assert_eq!(
            module_path("CS2040S", "Week 1: Intro", "slides.pdf"),
            PathBuf::from("CS2040S/Modules/Week 1_ Intro/slides.pdf")
        );
    }
}
