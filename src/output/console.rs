//! Console output utilities.

use console::style;

use crate::output::format::format_size;
use crate::selection::{Category, CourseInfo, LoadState, SelectionTree};

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Canvas Downloader                                 ║
║     Course content to disk, one category at a time    ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print the course being downloaded and where it goes.
pub fn print_course_summary(course: &CourseInfo, download_dir: &str) {
    println!();
    println!("{}", style(course.title()).bold());
    println!("  Course ID: {}", course.id);
    println!("  Folder:    {}", course.folder_name());
    println!("  Directory: {}", download_dir);
    println!();
}

fn checkbox(checked: bool) -> console::StyledObject<&'static str> {
    if checked {
        style("[x]").green()
    } else {
        style("[ ]").dim()
    }
}

fn print_category(category: &Category) {
    let state = match category.state() {
        LoadState::Unloaded => String::new(),
        LoadState::Loading => style(" (loading)").dim().to_string(),
        LoadState::Loaded if category.rows().is_empty() => style(" (empty)").dim().to_string(),
        LoadState::Loaded => format!(" ({})", category.rows().len()),
        LoadState::Failed(message) => style(format!(" (failed: {})", message)).red().to_string(),
    };

    println!(
        "{} {}{}",
        checkbox(category.is_checked()),
        style(category.label()).bold(),
        state
    );

    let mut current_module: Option<&str> = None;
    for row in category.rows() {
        let module = row.snapshot.module_name();
        if let Some(name) = module {
            if current_module != Some(name) {
                println!("    {}", style(name).underlined());
                current_module = Some(name);
            }
        }

        let indent = if module.is_some() { "      " } else { "    " };
        let size = row
            .snapshot
            .size
            .map(|bytes| style(format!(" {}", format_size(Some(bytes)))).dim().to_string())
            .unwrap_or_default();
        println!(
            "{}{} {} {}{}",
            indent,
            checkbox(row.checked),
            row.snapshot.name,
            style(format!("[{}:{}]", category.kind(), row.snapshot.id)).dim(),
            size
        );
    }
}

/// Print the selection tree in display order.
pub fn print_selection_tree(tree: &SelectionTree) {
    for category in tree.categories() {
        print_category(category);
    }
}
