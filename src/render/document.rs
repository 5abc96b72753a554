//! Minimal HTML documents for resources without a file form.
//!
//! Remote text is embedded as-is, without escaping.

use crate::render::grades::GradeRow;

const CELL_STYLE: &str = "border-bottom:1px solid #ccc;padding:8px";

/// A document to synthesize, borrowing from the fetched record.
#[derive(Debug, Clone, Copy)]
pub enum Document<'a> {
    Assignment {
        name: &'a str,
        description: Option<&'a str>,
    },
    /// Wiki pages, the home page and pages inside modules.
    Page {
        title: &'a str,
        body: Option<&'a str>,
    },
    Quiz {
        title: &'a str,
        description: Option<&'a str>,
        quiz_type: Option<&'a str>,
    },
    /// Discussion topics and announcements.
    Discussion {
        title: &'a str,
        author: Option<&'a str>,
        message: Option<&'a str>,
    },
    Syllabus {
        body: Option<&'a str>,
    },
    Grades {
        user_name: &'a str,
        rows: &'a [GradeRow],
    },
}

impl Document<'_> {
    /// MIME type of the rendered bytes.
    pub fn mime(&self) -> &'static str {
        "text/html"
    }
}

/// Render a document to bytes.
pub fn render(document: &Document<'_>) -> Vec<u8> {
    render_html(document).into_bytes()
}

/// Render a document to an HTML string.
pub fn render_html(document: &Document<'_>) -> String {
    match *document {
        Document::Assignment { name, description } => format!(
            "<html><head><title>{name}</title></head><body><h1>{name}</h1>{}</body></html>",
            description.unwrap_or("")
        ),
        Document::Page { title, body } => format!(
            "<html><head><title>{title}</title></head><body>{}</body></html>",
            body.unwrap_or("")
        ),
        Document::Quiz {
            title,
            description,
            quiz_type,
        } => format!(
            "<html><head><title>{title}</title></head><body><h1>{title}</h1>{}<hr><p>Type: {}</p></body></html>",
            description.unwrap_or(""),
            quiz_type.unwrap_or("")
        ),
        Document::Discussion {
            title,
            author,
            message,
        } => format!(
            "<html><head><title>{title}</title></head><body><h1>{title}</h1><p>Author: {}</p><hr>{}</body></html>",
            author.unwrap_or(""),
            message.unwrap_or("")
        ),
        Document::Syllabus { body } => format!(
            "<html><head><title>Syllabus</title></head><body><h1>Syllabus</h1>{}</body></html>",
            body.unwrap_or("")
        ),
        Document::Grades { user_name, rows } => {
            let rows: String = rows.iter().map(grade_row_html).collect();
            format!(
                "<html><head><title>Grades</title><style>table{{width:100%;border-collapse:collapse}}th{{text-align:left;background:#eee;padding:10px}}</style></head>\
                 <body><h1>Grades: {user_name}</h1><table><thead><tr><th>Assignment</th><th>Due</th><th>Score</th><th>Grade</th></tr></thead>\
                 <tbody>{rows}</tbody></table></body></html>"
            )
        }
    }
}

fn grade_row_html(row: &GradeRow) -> String {
    format!(
        "<tr><td style=\"{CELL_STYLE}\">{}</td><td style=\"{CELL_STYLE}\">{}</td><td style=\"{CELL_STYLE}\"><b>{}</b>/{}</td><td style=\"{CELL_STYLE}\">{}</td></tr>",
        row.name, row.due, row.score, row.points_possible, row.grade
    )
}
