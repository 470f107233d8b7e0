//! Session event log, transcript reading and context extraction.
//!
//! `stop.json` is a pretty-printed JSON array rewritten on every event.
//! The read-modify-write is not guarded against concurrent writers.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RecorderError;

pub const EVENT_LOG_FILE: &str = "stop.json";
pub const CHAT_EXPORT_FILE: &str = "chat.json";

const CONTEXT_WINDOW: usize = 4;
const CONTEXT_LINES: usize = 3;
const USER_MAX_CHARS: usize = 200;
const ASSISTANT_MAX_CHARS: usize = 500;

/// The record the host pipes in on stdin. The raw JSON is kept as-is so the
/// log stores exactly what was received.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session_id: String,
    pub stop_hook_active: bool,
    pub transcript_path: Option<PathBuf>,
    record: Value,
}

impl SessionEvent {
    /// Parse a JSON object. Anything that is not an object is rejected; a
    /// known field of the wrong type just reads as absent.
    pub fn from_json(input: &str) -> Result<Self, RecorderError> {
        let record: Value = serde_json::from_str(input)?;
        Self::from_value(record)
    }

    pub fn from_value(record: Value) -> Result<Self, RecorderError> {
        if !record.is_object() {
            return Err(RecorderError::NotAnObject);
        }
        let session_id = record
            .get("session_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let stop_hook_active = record
            .get("stop_hook_active")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let transcript_path = record
            .get("transcript_path")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            session_id,
            stop_hook_active,
            transcript_path,
            record,
        })
    }

    pub fn record(&self) -> &Value {
        &self.record
    }
}

/// Append `event` to `<log_dir>/stop.json`, creating the directory if needed.
/// An unreadable or corrupt log is replaced by a fresh one.
pub fn append_event(log_dir: &Path, event: &SessionEvent) -> Result<PathBuf, RecorderError> {
    fs::create_dir_all(log_dir).map_err(|e| RecorderError::io(log_dir, e))?;

    let path = log_dir.join(EVENT_LOG_FILE);
    let mut entries = load_event_log(&path);
    entries.push(event.record().clone());
    write_pretty(&path, &entries)?;

    debug!("Appended event to {} ({} entries)", path.display(), entries.len());
    Ok(path)
}

/// Read the event log; a missing or malformed file reads as empty.
pub fn load_event_log(path: &Path) -> Vec<Value> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {}: {e}, starting a fresh log", path.display());
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Value>>(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Malformed event log {}: {e}, starting a fresh log", path.display());
            Vec::new()
        }
    }
}

/// Read a JSONL transcript, skipping blank and unparseable lines.
pub fn read_transcript(path: &Path) -> Result<Vec<Value>, RecorderError> {
    let contents = fs::read_to_string(path).map_err(|e| RecorderError::io(path, e))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("Skipping malformed transcript line: {e}");
                None
            }
        })
        .collect())
}

/// Write every transcript entry to `<log_dir>/chat.json` as one JSON array.
pub fn export_chat(log_dir: &Path, entries: &[Value]) -> Result<PathBuf, RecorderError> {
    fs::create_dir_all(log_dir).map_err(|e| RecorderError::io(log_dir, e))?;
    let path = log_dir.join(CHAT_EXPORT_FILE);
    write_pretty(&path, entries)?;
    Ok(path)
}

/// Build the conversation context for the completion prompt.
///
/// Looks at the last 4 entries only, keeps user turns (first 200 chars) and
/// assistant turns under 500 chars, and joins the last 3 survivors with
/// newlines. Each turn is flattened onto a single line.
pub fn extract_context(entries: &[Value]) -> Option<String> {
    let window = &entries[entries.len().saturating_sub(CONTEXT_WINDOW)..];
    let lines: Vec<String> = window.iter().filter_map(context_line).collect();
    let recent = &lines[lines.len().saturating_sub(CONTEXT_LINES)..];

    let context = recent.join("\n");
    (!context.is_empty()).then_some(context)
}

fn context_line(entry: &Value) -> Option<String> {
    let text = turn_text(entry)?;
    match entry.get("type")?.as_str()? {
        "user" => {
            let flat = flatten(&text);
            let truncated: String = flat.chars().take(USER_MAX_CHARS).collect();
            Some(format!("User: {truncated}"))
        }
        "assistant" if text.chars().count() < ASSISTANT_MAX_CHARS => {
            Some(format!("Assistant: {}", flatten(&text)))
        }
        _ => None,
    }
}

/// Text of a turn: a top-level `content` string, or `message.content` as a
/// string or an array of `text` blocks.
fn turn_text(entry: &Value) -> Option<String> {
    let content = entry
        .get("content")
        .filter(|c| !c.is_null())
        .or_else(|| entry.get("message").and_then(|m| m.get("content")))?;

    let text = match content {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter(|b| b["type"] == "text")
            .filter_map(|b| b["text"].as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };

    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RecorderError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| RecorderError::io(path, e))
}
