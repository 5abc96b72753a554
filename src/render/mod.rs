//! Document synthesis for resources that have no downloadable file.

pub mod document;
pub mod grades;

pub use document::{render, render_html, Document};
pub use grades::{format_due_date, grade_rows, GradeRow};
