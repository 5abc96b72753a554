//! Statistics reporting.

use console::style;

use crate::download::RunStats;
use crate::output::format::format_size;
use crate::selection::SelectionStats;

/// `N items selected (size)`
pub fn selection_line(stats: &SelectionStats) -> String {
    format!(
        "{} items selected ({})",
        stats.count,
        format_size(Some(stats.total_bytes))
    )
}

/// Print the count and size of the checked items.
pub fn print_selection_stats(stats: &SelectionStats) {
    println!("{}", style(selection_line(stats)).bold());
}

/// Print the outcome of a download run.
pub fn print_run_stats(stats: &RunStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Download Statistics:").bold());
    println!("  Transfers: {}", stats.issued);
    println!("  Saved:     {}", style(stats.succeeded).green());
    if stats.failed > 0 {
        println!("  Failed:    {}", style(stats.failed).red());
    }
    if stats.fetch_failures > 0 {
        println!("  Fetch errors: {}", style(stats.fetch_failures).red());
    }
    if stats.skipped > 0 {
        println!("  Skipped:   {}", style(stats.skipped).yellow());
    }
    println!("{}", style("═".repeat(50)).dim());
}
