//! Backend selection and graceful degradation.
//!
//! - `provider`: static priority tables per capability
//! - `selector`: availability checks and ordered selection
//! - `invoker`: one bounded attempt, faults folded into an outcome
//! - `generator`: completion message cascade with canned fallback
//! - `announcer`: single-attempt speech

pub mod announcer;
pub mod generator;
pub mod invoker;
pub mod provider;
pub mod selector;

pub use announcer::{Announcement, AnnouncementService};
pub use generator::{CompletionMessage, CompletionMessageGenerator, MessageSource, CANNED_MESSAGES};
pub use invoker::{BoundedInvoker, InvocationOutcome};
pub use provider::{Capability, Provider, ProviderId, Requirement};
pub use selector::{BackendSelector, ProviderAvailability};

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backends for cascade tests.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::ProviderId;
    use crate::backends::{BackendFactory, SpeechBackend, TextBackend};
    use crate::error::ProviderError;

    #[derive(Debug, Clone)]
    pub enum Script {
        Reply(&'static str),
        Fail,
        Hang,
        Panic,
    }

    pub type CallLog = Arc<Mutex<Vec<(ProviderId, String)>>>;

    #[derive(Default)]
    pub struct ScriptedBackends {
        scripts: HashMap<ProviderId, Script>,
        calls: CallLog,
    }

    impl ScriptedBackends {
        pub fn with(mut self, id: ProviderId, script: Script) -> Self {
            self.scripts.insert(id, script);
            self
        }

        pub fn calls(&self) -> CallLog {
            self.calls.clone()
        }

        fn backend(&self, id: ProviderId) -> Option<ScriptedBackend> {
            self.scripts.get(&id).map(|script| ScriptedBackend {
                id,
                script: script.clone(),
                calls: self.calls.clone(),
            })
        }
    }

    impl BackendFactory for ScriptedBackends {
        fn text_backend(&self, id: ProviderId) -> Option<Box<dyn TextBackend>> {
            self.backend(id).map(|b| Box::new(b) as Box<dyn TextBackend>)
        }

        fn speech_backend(&self, id: ProviderId) -> Option<Box<dyn SpeechBackend>> {
            self.backend(id).map(|b| Box::new(b) as Box<dyn SpeechBackend>)
        }
    }

    struct ScriptedBackend {
        id: ProviderId,
        script: Script,
        calls: CallLog,
    }

    impl ScriptedBackend {
        async fn run(&self, payload: &str) -> Result<String, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((self.id, payload.to_string()));
            match &self.script {
                Script::Reply(text) => Ok((*text).to_string()),
                Script::Fail => Err(ProviderError::status(503, "overloaded")),
                Script::Hang => {
                    std::future::pending::<()>().await;
                    Ok(String::new())
                }
                Script::Panic => panic!("scripted panic"),
            }
        }
    }

    #[async_trait]
    impl TextBackend for ScriptedBackend {
        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            self.run(prompt).await
        }
    }

    #[async_trait]
    impl SpeechBackend for ScriptedBackend {
        async fn speak(&self, text: &str) -> Result<(), ProviderError> {
            self.run(text).await.map(|_| ())
        }
    }
}
