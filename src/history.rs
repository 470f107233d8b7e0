//! Announcement history.
//!
//! One JSONL record per hook run in `<log_dir>/announcements.jsonl`, so a
//! silent run can be explained after the fact.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cascade::{Announcement, CompletionMessage};

pub const HISTORY_FILE: &str = "announcements.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    pub timestamp: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// `spoke`, `failed` or `skipped`.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub duration_ms: u64,
}

impl AnnouncementRecord {
    pub fn new(
        session_id: &str,
        message: Option<&CompletionMessage>,
        announcement: &Announcement,
        duration_ms: u64,
    ) -> Self {
        let (speaker, action, detail) = match announcement {
            Announcement::Spoke(id) => (Some(id.as_str()), "spoke", None),
            Announcement::Failed { provider, reason } => {
                (Some(provider.as_str()), "failed", Some(reason.clone()))
            }
            Announcement::NoSpeaker => (None, "skipped", Some("no speech provider".to_string())),
        };

        Self {
            timestamp: now_timestamp(),
            session_id: session_id.to_string(),
            message: message.map(|m| m.text.clone()),
            message_source: message.map(|m| m.source.as_str().to_string()),
            speaker: speaker.map(String::from),
            action: action.into(),
            detail,
            duration_ms,
        }
    }
}

fn now_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}

/// Append a record to the history file. Failures are logged, never returned.
pub fn save_record(log_dir: &Path, record: &AnnouncementRecord) {
    if let Err(e) = fs::create_dir_all(log_dir) {
        warn!("Failed to create {}: {e}", log_dir.display());
        return;
    }

    let path = log_dir.join(HISTORY_FILE);
    let json = match serde_json::to_string(record) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize history record: {e}");
            return;
        }
    };

    match fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(mut file) => {
            if let Err(e) = writeln!(file, "{json}") {
                warn!("Failed to write history record: {e}");
            } else {
                debug!("Saved announcement record to {}", path.display());
            }
        }
        Err(e) => warn!("Failed to open {}: {e}", path.display()),
    }
}
