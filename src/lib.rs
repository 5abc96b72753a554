//! Canvas Downloader - selective export of Canvas course content
//!
//! This library browses a Canvas course as a tree of content categories,
//! turns the user's selection into a download payload and executes it into
//! a local folder tree.
//!
//! # Features
//!
//! - Lazy, idempotent loading of category contents
//! - Whole-category (`ALL`) or per-item (`SELECT`) downloads
//! - Files and module files transferred as-is
//! - Assignments, pages, quizzes, discussions, announcements, the home
//!   page, the syllabus and grades rendered to standalone HTML
//! - Failure isolation per item; only an invalid token stops a run
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use canvas_downloader::{CanvasApi, Config, Credentials, CourseSession, FsTransferSink, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let token = config.account.token.clone().unwrap_or_default();
//!     let api = CanvasApi::new(&config.account.base_url, Credentials::new(token))?;
//!
//!     let session = CourseSession::open(&api, 12345, &[]).await?;
//!     let payload = session.build_payload()?;
//!
//!     let sink = Arc::new(FsTransferSink::new("downloads", api.http_client().clone()));
//!     let stats = Orchestrator::new(api, sink, 12345, session.course().code.as_deref())
//!         .run(&payload)
//!         .await?;
//!     println!("{} files saved", stats.succeeded);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod output;
pub mod render;
pub mod selection;

// Re-exports for convenience
pub use api::{CanvasApi, Credentials};
pub use config::Config;
pub use download::{dispatch, Command, FsTransferSink, Orchestrator, RunStats, TransferSink};
pub use error::{Error, Result};
pub use selection::{CourseSession, DownloadPayload, SelectionTree};
