//! Static provider tables, one per capability, highest priority first.

use std::fmt;

use crate::environment::{ANTHROPIC_API_KEY, ELEVENLABS_API_KEY, OPENAI_API_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    GenerateText,
    SpeakText,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateText => "generate-text",
            Self::SpeakText => "speak-text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    ElevenLabs,
    OpenAiTts,
    SystemVoice,
}

impl ProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::ElevenLabs => "elevenlabs",
            Self::OpenAiTts => "openai-tts",
            Self::SystemVoice => "system-voice",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What must be present before a provider is worth attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A non-blank credential under this environment key.
    Credential(&'static str),
    /// One of the configured local speech commands on the search path.
    LocalCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub id: ProviderId,
    pub capability: Capability,
    pub requirement: Requirement,
}

pub const TEXT_PROVIDERS: &[Provider] = &[
    Provider {
        id: ProviderId::OpenAi,
        capability: Capability::GenerateText,
        requirement: Requirement::Credential(OPENAI_API_KEY),
    },
    Provider {
        id: ProviderId::Anthropic,
        capability: Capability::GenerateText,
        requirement: Requirement::Credential(ANTHROPIC_API_KEY),
    },
];

pub const SPEECH_PROVIDERS: &[Provider] = &[
    Provider {
        id: ProviderId::ElevenLabs,
        capability: Capability::SpeakText,
        requirement: Requirement::Credential(ELEVENLABS_API_KEY),
    },
    Provider {
        id: ProviderId::OpenAiTts,
        capability: Capability::SpeakText,
        requirement: Requirement::Credential(OPENAI_API_KEY),
    },
    Provider {
        id: ProviderId::SystemVoice,
        capability: Capability::SpeakText,
        requirement: Requirement::LocalCommand,
    },
];

pub fn priority_table(capability: Capability) -> &'static [Provider] {
    match capability {
        Capability::GenerateText => TEXT_PROVIDERS,
        Capability::SpeakText => SPEECH_PROVIDERS,
    }
}
