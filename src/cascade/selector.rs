//! Provider availability and priority-ordered selection.

use super::provider::{priority_table, Capability, Provider, Requirement};
use crate::environment::Environment;

/// Answers "could this provider be attempted right now?" without calling it.
#[derive(Debug, Clone, Default)]
pub struct ProviderAvailability {
    env: Environment,
    speech_commands: Vec<String>,
}

impl ProviderAvailability {
    pub fn new(env: Environment, speech_commands: Vec<String>) -> Self {
        Self {
            env,
            speech_commands,
        }
    }

    pub fn is_available(&self, provider: &Provider) -> bool {
        match provider.requirement {
            Requirement::Credential(key) => self.env.credential(key).is_some(),
            Requirement::LocalCommand => self.env.find_command(&self.speech_commands).is_some(),
        }
    }
}

/// Picks providers from the fixed priority tables.
#[derive(Debug, Clone, Default)]
pub struct BackendSelector {
    availability: ProviderAvailability,
}

impl BackendSelector {
    pub fn new(availability: ProviderAvailability) -> Self {
        Self { availability }
    }

    /// Highest-priority available provider for `capability`.
    pub fn select(&self, capability: Capability) -> Option<&'static Provider> {
        self.candidates(capability).next()
    }

    /// All available providers for `capability`, in priority order.
    pub fn candidates(&self, capability: Capability) -> impl Iterator<Item = &'static Provider> + '_ {
        priority_table(capability)
            .iter()
            .filter(move |p| self.availability.is_available(p))
    }
}
