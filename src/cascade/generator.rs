//! Completion message generation.
//!
//! Text providers are tried in priority order, one bounded attempt each.
//! The first reply that survives sanitization wins; if none does, a canned
//! phrase is picked at random. Always returns a non-empty message.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use super::invoker::{BoundedInvoker, InvocationOutcome};
use super::provider::{Capability, ProviderId};
use super::selector::BackendSelector;
use crate::backends::BackendFactory;
use crate::prompts::completion_prompt;

pub const CANNED_MESSAGES: [&str; 5] = [
    "Work complete!",
    "All done!",
    "Task finished!",
    "Job complete!",
    "Ready for next task!",
];

const QUOTES: &[char] = &['"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    Provider(ProviderId),
    Canned,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider(id) => id.as_str(),
            Self::Canned => "canned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMessage {
    pub text: String,
    pub source: MessageSource,
}

pub struct CompletionMessageGenerator {
    selector: BackendSelector,
    invoker: BoundedInvoker,
    backends: Arc<dyn BackendFactory>,
    engineer_name: Option<String>,
}

impl CompletionMessageGenerator {
    pub fn new(
        selector: BackendSelector,
        invoker: BoundedInvoker,
        backends: Arc<dyn BackendFactory>,
        engineer_name: Option<String>,
    ) -> Self {
        Self {
            selector,
            invoker,
            backends,
            engineer_name,
        }
    }

    pub async fn generate(&self, context: Option<&str>) -> String {
        self.resolve(context).await.text
    }

    /// Like [`generate`](Self::generate), also reporting where the text came from.
    pub async fn resolve(&self, context: Option<&str>) -> CompletionMessage {
        let prompt = completion_prompt(context, self.engineer_name.as_deref());

        for provider in self.selector.candidates(Capability::GenerateText) {
            match self.attempt(provider.id, &prompt).await {
                InvocationOutcome::Success(text) => {
                    info!(provider = provider.id.as_str(), capability = provider.capability.as_str(), "Generated completion message");
                    return CompletionMessage {
                        text,
                        source: MessageSource::Provider(provider.id),
                    };
                }
                InvocationOutcome::Failure(reason) => {
                    debug!(
                        provider = provider.id.as_str(),
                        capability = provider.capability.as_str(),
                        reason = reason.as_str(),
                        "Trying next text provider"
                    );
                }
                InvocationOutcome::Unavailable => {
                    debug!(provider = provider.id.as_str(), capability = provider.capability.as_str(), "Text provider unavailable");
                }
            }
        }

        let text = canned_message(&mut rand::thread_rng());
        debug!("Using canned completion message");
        CompletionMessage {
            text: text.to_string(),
            source: MessageSource::Canned,
        }
    }

    async fn attempt(&self, id: ProviderId, prompt: &str) -> InvocationOutcome<String> {
        let Some(backend) = self.backends.text_backend(id) else {
            return InvocationOutcome::Unavailable;
        };

        let prompt = prompt.to_string();
        let outcome = self
            .invoker
            .invoke(id, async move { backend.generate(&prompt).await })
            .await;

        match outcome {
            InvocationOutcome::Success(raw) => match sanitize(&raw) {
                Some(text) => InvocationOutcome::Success(text),
                None => InvocationOutcome::Failure("empty after sanitization".into()),
            },
            other => other,
        }
    }
}

/// Strip surrounding quotes and whitespace and keep the first line.
pub fn sanitize(raw: &str) -> Option<String> {
    let unquoted = raw.trim().trim_matches(QUOTES).trim();
    let first_line = unquoted.lines().next().unwrap_or_default();
    let cleaned = first_line.trim().trim_matches(QUOTES).trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

pub fn canned_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CANNED_MESSAGES[rng.gen_range(0..CANNED_MESSAGES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::cascade::selector::ProviderAvailability;
    use crate::cascade::testing::{Script, ScriptedBackends};
    use crate::environment::{Environment, ANTHROPIC_API_KEY, OPENAI_API_KEY};

    const TIMEOUT: Duration = Duration::from_millis(150);

    fn generator(keys: &[&str], backends: ScriptedBackends, name: Option<&str>) -> CompletionMessageGenerator {
        let env = Environment::from_pairs(keys.iter().map(|k| (*k, "key")));
        CompletionMessageGenerator::new(
            BackendSelector::new(ProviderAvailability::new(env, Vec::new())),
            BoundedInvoker::new(TIMEOUT),
            Arc::new(backends),
            name.map(String::from),
        )
    }

    #[test]
    fn sanitize_strips_quotes_and_extra_lines() {
        assert_eq!(sanitize("  \"All set, Dana!\"  ").as_deref(), Some("All set, Dana!"));
        assert_eq!(sanitize("'Done.'\nHere is why...").as_deref(), Some("Done."));
        assert_eq!(sanitize("\u{201c}Shipped it.\u{201d}").as_deref(), Some("Shipped it."));
        assert_eq!(sanitize("\"\""), None);
        assert_eq!(sanitize("  \n  "), None);
    }

    #[test]
    fn canned_choice_is_spread_over_all_phrases() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 5];
        for _ in 0..1000 {
            let msg = canned_message(&mut rng);
            let idx = CANNED_MESSAGES.iter().position(|m| *m == msg).unwrap();
            counts[idx] += 1;
        }
        assert!(counts.iter().all(|&c| c > 120), "{counts:?}");
    }

    #[tokio::test]
    async fn no_providers_gives_canned_phrase() {
        let gen = generator(&[], ScriptedBackends::default(), None);
        for _ in 0..20 {
            let msg = gen.resolve(Some("User: do things")).await;
            assert_eq!(msg.source, MessageSource::Canned);
            assert!(CANNED_MESSAGES.contains(&msg.text.as_str()));
        }
    }

    #[tokio::test]
    async fn primary_reply_is_returned_sanitized() {
        let backends = ScriptedBackends::default()
            .with(ProviderId::OpenAi, Script::Reply("\"I've completed the following task: added login. Ready for next task!\"\n"))
            .with(ProviderId::Anthropic, Script::Reply("should not be used"));
        let calls = backends.calls();
        let gen = generator(&[OPENAI_API_KEY, ANTHROPIC_API_KEY], backends, None);

        let msg = gen.resolve(Some("User: add login")).await;
        assert_eq!(msg.text, "I've completed the following task: added login. Ready for next task!");
        assert_eq!(msg.source, MessageSource::Provider(ProviderId::OpenAi));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ProviderId::OpenAi);
        assert!(calls[0].1.contains("User: add login"));
    }

    #[tokio::test]
    async fn failing_primary_falls_through_to_secondary() {
        let backends = ScriptedBackends::default()
            .with(ProviderId::OpenAi, Script::Fail)
            .with(ProviderId::Anthropic, Script::Reply("All wrapped up!"));
        let gen = generator(&[OPENAI_API_KEY, ANTHROPIC_API_KEY], backends, None);

        let msg = gen.resolve(None).await;
        assert_eq!(msg.text, "All wrapped up!");
        assert_eq!(msg.source, MessageSource::Provider(ProviderId::Anthropic));
    }

    #[tokio::test]
    async fn blank_and_panicking_providers_fall_back_to_canned() {
        let backends = ScriptedBackends::default()
            .with(ProviderId::OpenAi, Script::Reply("''"))
            .with(ProviderId::Anthropic, Script::Panic);
        let gen = generator(&[OPENAI_API_KEY, ANTHROPIC_API_KEY], backends, None);

        let msg = gen.resolve(None).await;
        assert_eq!(msg.source, MessageSource::Canned);
        assert!(!msg.text.is_empty());
    }

    #[tokio::test]
    async fn unbuildable_backend_is_skipped() {
        // Credential present, but the factory has nothing for openai.
        let backends = ScriptedBackends::default().with(ProviderId::Anthropic, Script::Reply("Done!"));
        let gen = generator(&[OPENAI_API_KEY, ANTHROPIC_API_KEY], backends, None);
        assert_eq!(gen.generate(None).await, "Done!");
    }

    #[tokio::test]
    async fn hanging_providers_are_bounded() {
        let backends = ScriptedBackends::default()
            .with(ProviderId::OpenAi, Script::Hang)
            .with(ProviderId::Anthropic, Script::Hang);
        let gen = generator(&[OPENAI_API_KEY, ANTHROPIC_API_KEY], backends, None);

        let started = Instant::now();
        let msg = gen.resolve(None).await;
        assert_eq!(msg.source, MessageSource::Canned);
        assert!(started.elapsed() < TIMEOUT * 2 + Duration::from_millis(300));
    }

    #[tokio::test]
    async fn prompt_follows_context_and_name() {
        let backends = ScriptedBackends::default().with(ProviderId::OpenAi, Script::Reply("Ready, Dana!"));
        let calls = backends.calls();
        let gen = generator(&[OPENAI_API_KEY], backends, Some("Dana"));

        gen.generate(None).await;
        gen.generate(Some("User: refactor the parser")).await;

        let calls = calls.lock().unwrap();
        assert!(!calls[0].1.contains("I've completed the following task"));
        assert!(calls[0].1.contains("'Dana'"));
        assert!(calls[1].1.contains("I've completed the following task"));
        assert!(calls[1].1.contains("User: refactor the parser"));
    }
}
