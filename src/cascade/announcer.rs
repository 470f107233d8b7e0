//! Speaks the completion message with the best available speech provider.
//!
//! One attempt only. Whatever happens is reported back for the history
//! record and otherwise ignored.

use std::sync::Arc;

use tracing::{debug, info};

use super::invoker::{BoundedInvoker, InvocationOutcome};
use super::provider::{Capability, Provider, ProviderId};
use super::selector::BackendSelector;
use crate::backends::BackendFactory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    Spoke(ProviderId),
    Failed { provider: ProviderId, reason: String },
    NoSpeaker,
}

pub struct AnnouncementService {
    selector: BackendSelector,
    invoker: BoundedInvoker,
    backends: Arc<dyn BackendFactory>,
}

impl AnnouncementService {
    pub fn new(selector: BackendSelector, invoker: BoundedInvoker, backends: Arc<dyn BackendFactory>) -> Self {
        Self {
            selector,
            invoker,
            backends,
        }
    }

    /// The provider `announce` would use right now.
    pub fn speaker(&self) -> Option<&'static Provider> {
        self.selector.select(Capability::SpeakText)
    }

    pub async fn announce(&self, message: &str) -> Announcement {
        let Some(provider) = self.speaker() else {
            debug!("No speech provider available");
            return Announcement::NoSpeaker;
        };

        let outcome = match self.backends.speech_backend(provider.id) {
            Some(backend) => {
                let text = message.to_string();
                self.invoker
                    .invoke(provider.id, async move { backend.speak(&text).await })
                    .await
            }
            None => InvocationOutcome::Unavailable,
        };

        match outcome {
            InvocationOutcome::Success(()) => {
                info!(provider = provider.id.as_str(), capability = provider.capability.as_str(), "Announced completion");
                Announcement::Spoke(provider.id)
            }
            InvocationOutcome::Failure(reason) => Announcement::Failed {
                provider: provider.id,
                reason,
            },
            InvocationOutcome::Unavailable => Announcement::Failed {
                provider: provider.id,
                reason: "unavailable".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::cascade::selector::ProviderAvailability;
    use crate::cascade::testing::{Script, ScriptedBackends};
    use crate::environment::{Environment, ELEVENLABS_API_KEY, OPENAI_API_KEY};

    fn service(keys: &[&str], backends: ScriptedBackends) -> AnnouncementService {
        let env = Environment::from_pairs(keys.iter().map(|k| (*k, "key")));
        AnnouncementService::new(
            BackendSelector::new(ProviderAvailability::new(env, vec!["say".into()])),
            BoundedInvoker::new(Duration::from_millis(150)),
            Arc::new(backends),
        )
    }

    #[tokio::test]
    async fn no_speaker_returns_without_invoking() {
        let backends = ScriptedBackends::default().with(ProviderId::SystemVoice, Script::Reply(""));
        let calls = backends.calls();
        let svc = service(&[], backends);

        let started = Instant::now();
        assert_eq!(svc.announce("All done!").await, Announcement::NoSpeaker);
        assert!(started.elapsed() < Duration::from_millis(50));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn highest_priority_speaker_gets_the_message() {
        let backends = ScriptedBackends::default()
            .with(ProviderId::ElevenLabs, Script::Reply(""))
            .with(ProviderId::OpenAiTts, Script::Reply(""));
        let calls = backends.calls();
        let svc = service(&[ELEVENLABS_API_KEY, OPENAI_API_KEY], backends);

        assert_eq!(svc.announce("All done!").await, Announcement::Spoke(ProviderId::ElevenLabs));
        let calls = calls.lock().unwrap();
        assert_eq!(*calls, vec![(ProviderId::ElevenLabs, "All done!".to_string())]);
    }

    #[tokio::test]
    async fn failed_speaker_is_not_retried_elsewhere() {
        let backends = ScriptedBackends::default()
            .with(ProviderId::ElevenLabs, Script::Fail)
            .with(ProviderId::OpenAiTts, Script::Reply(""));
        let calls = backends.calls();
        let svc = service(&[ELEVENLABS_API_KEY, OPENAI_API_KEY], backends);

        match svc.announce("All done!").await {
            Announcement::Failed { provider, .. } => assert_eq!(provider, ProviderId::ElevenLabs),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn hanging_speaker_times_out() {
        let backends = ScriptedBackends::default().with(ProviderId::OpenAiTts, Script::Hang);
        let svc = service(&[OPENAI_API_KEY], backends);

        let outcome = svc.announce("All done!").await;
        assert_eq!(
            outcome,
            Announcement::Failed {
                provider: ProviderId::OpenAiTts,
                reason: "timeout".into()
            }
        );
    }
}
