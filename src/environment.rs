//! Process environment snapshot: credentials, operator name, tool search path.
//!
//! Captured once at start-up and passed around by value, so nothing else in
//! the crate reads `std::env` directly.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
pub const ENGINEER_NAME: &str = "ENGINEER_NAME";

const CAPTURED_KEYS: [&str; 4] = [
    OPENAI_API_KEY,
    ANTHROPIC_API_KEY,
    ELEVENLABS_API_KEY,
    ENGINEER_NAME,
];

#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
    search_path: Option<OsString>,
}

impl Environment {
    /// Load `.env` from the working directory (if any) and snapshot the
    /// process environment.
    pub fn capture() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Ignoring .env: {e}"),
        }

        let vars = CAPTURED_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();

        Self {
            vars,
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Build a snapshot from explicit pairs, with no tool search path.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            search_path: None,
        }
    }

    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// A credential counts as present when it is set and not blank.
    /// Its validity is not checked here.
    pub fn credential(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn engineer_name(&self) -> Option<&str> {
        self.credential(ENGINEER_NAME)
    }

    /// First of `candidates` that resolves to an executable on the search path.
    pub fn find_command(&self, candidates: &[String]) -> Option<PathBuf> {
        let paths = self.search_path.as_ref()?;
        let cwd = std::env::current_dir().unwrap_or_default();
        candidates
            .iter()
            .find_map(|name| which::which_in(name, Some(paths), &cwd).ok())
    }
}
