//! One session-end run: record the event, build context, generate and
//! speak the completion message, write the history record.
//!
//! Nothing in here returns an error to the caller.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backends::{BackendFactory, LiveBackends};
use crate::cascade::{
    Announcement, AnnouncementService, BackendSelector, BoundedInvoker, CompletionMessageGenerator,
    ProviderAvailability,
};
use crate::config::Config;
use crate::environment::Environment;
use crate::history::{self, AnnouncementRecord};
use crate::recorder::{self, SessionEvent};

pub struct Hook {
    config: Config,
    generator: CompletionMessageGenerator,
    announcer: AnnouncementService,
}

impl Hook {
    pub fn new(config: Config, env: Environment) -> Self {
        let backends = Arc::new(LiveBackends::new(config.clone(), env.clone()));
        Self::with_backends(config, env, backends)
    }

    pub fn with_backends(config: Config, env: Environment, backends: Arc<dyn BackendFactory>) -> Self {
        let engineer_name = env.engineer_name().map(String::from);
        let selector = BackendSelector::new(ProviderAvailability::new(
            env,
            config.speech.system_voices.clone(),
        ));
        let invoker = BoundedInvoker::new(config.attempt_timeout());

        Self {
            generator: CompletionMessageGenerator::new(
                selector.clone(),
                invoker,
                backends.clone(),
                engineer_name,
            ),
            announcer: AnnouncementService::new(selector, invoker, backends),
            config,
        }
    }

    /// Handle the raw stdin payload. Returns the history record that was
    /// written, or `None` when the payload was not a session event.
    pub async fn run(&self, input: &str, export_chat: bool) -> Option<AnnouncementRecord> {
        let started = Instant::now();

        let event = match SessionEvent::from_json(input) {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring malformed session event: {e}");
                return None;
            }
        };
        debug!(
            session_id = event.session_id.as_str(),
            stop_hook_active = event.stop_hook_active,
            "Session ended"
        );

        let log_dir = &self.config.log_dir;
        if let Err(e) = recorder::append_event(log_dir, &event) {
            warn!("Failed to record session event: {e}");
        }

        let transcript = event.transcript_path.as_deref().and_then(load_transcript);
        let context = transcript.as_deref().and_then(recorder::extract_context);

        if export_chat {
            if let Some(entries) = &transcript {
                match recorder::export_chat(log_dir, entries) {
                    Ok(path) => debug!("Exported transcript to {}", path.display()),
                    Err(e) => warn!("Failed to export transcript: {e}"),
                }
            }
        }

        // Nobody would hear the message, so don't spend an LLM call on it.
        let (message, announcement) = if self.announcer.speaker().is_none() {
            info!("No speech provider available, skipping announcement");
            (None, Announcement::NoSpeaker)
        } else {
            let message = self.generator.resolve(context.as_deref()).await;
            let announcement = self.announcer.announce(&message.text).await;
            (Some(message), announcement)
        };

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let record = AnnouncementRecord::new(&event.session_id, message.as_ref(), &announcement, duration_ms);
        history::save_record(log_dir, &record);
        Some(record)
    }
}

fn load_transcript(path: &Path) -> Option<Vec<Value>> {
    if !path.exists() {
        debug!("Transcript {} does not exist", path.display());
        return None;
    }
    match recorder::read_transcript(path) {
        Ok(entries) => Some(entries),
        Err(e) => {
            warn!("Failed to read transcript: {e}");
            None
        }
    }
}
