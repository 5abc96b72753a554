//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Byte size formatting
//! - Statistics reporting

pub mod console;
pub mod format;
pub mod progress;
pub mod stats;

pub use self::console::{
    print_banner, print_course_summary, print_error, print_info, print_selection_tree,
    print_success, print_warning,
};
pub use format::format_size;
pub use progress::{create_download_bar, create_spinner};
pub use stats::{print_run_stats, print_selection_stats, selection_line};
