//! Commands that trigger a download run.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::CanvasApi;
use crate::download::orchestrator::Orchestrator;
use crate::download::state::RunStats;
use crate::download::transfer::TransferSink;
use crate::error::{Error, Result};
use crate::selection::DownloadPayload;

/// A download request as exchanged between the selection front end and the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Download the payload for one course.
    #[serde(rename_all = "camelCase")]
    DownloadGranular {
        course_id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        course_code: Option<String>,
        payload: DownloadPayload,
    },
    /// Legacy trigger without a payload. Ignored.
    StartDownload,
}

impl Command {
    /// Read a command from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the command to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Execute a command. Returns `None` for commands that do nothing.
pub async fn dispatch(
    command: Command,
    api: &CanvasApi,
    sink: Arc<dyn TransferSink>,
) -> Result<Option<RunStats>> {
    match command {
        Command::DownloadGranular {
            course_id,
            course_code,
            payload,
        } => {
            if payload.is_empty() {
                return Err(Error::EmptySelection);
            }

            let orchestrator =
                Orchestrator::new(api.clone(), sink, course_id, course_code.as_deref());
            orchestrator.run(&payload).await.map(Some)
        }
        Command::StartDownload => {
            tracing::warn!("Received legacy START_DOWNLOAD command, ignoring");
            Ok(None)
        }
    }
}
