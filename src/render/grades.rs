//! Grade table rows.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};

use crate::api::{Assignment, Submission};

/// One row of the grades table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRow {
    pub name: String,
    pub due: String,
    pub score: String,
    pub points_possible: String,
    pub grade: String,
}

impl GradeRow {
    /// `<score>/<points possible>`
    pub fn score_text(&self) -> String {
        format!("{}/{}", self.score, self.points_possible)
    }
}

/// Build one row per submission, in submission order.
///
/// Submissions whose assignment is unknown are named `Assignment <id>`.
pub fn grade_rows(assignments: Vec<Assignment>, submissions: &[Submission]) -> Vec<GradeRow> {
    let assignments: HashMap<u64, Assignment> = assignments
        .into_iter()
        .map(|assignment| (assignment.id, assignment))
        .collect();

    submissions
        .iter()
        .map(|submission| {
            let assignment = assignments.get(&submission.assignment_id);

            GradeRow {
                name: assignment
                    .map(|a| a.name.clone())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| format!("Assignment {}", submission.assignment_id)),
                due: assignment
                    .and_then(|a| a.due_at)
                    .map(format_due_date)
                    .unwrap_or_default(),
                score: submission
                    .score
                    .map(format_number)
                    .unwrap_or_else(|| "-".to_string()),
                points_possible: assignment
                    .and_then(|a| a.points_possible)
                    .map(format_number)
                    .unwrap_or_else(|| "-".to_string()),
                grade: submission
                    .grade
                    .clone()
                    .filter(|grade| !grade.is_empty())
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

/// Local calendar date, `M/D/YYYY`.
pub fn format_due_date(due_at: DateTime<Utc>) -> String {
    due_at.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

/// Whole numbers print without a fractional part.
fn format_number(value: f64) -> String {
    format!("{}", value)
}
