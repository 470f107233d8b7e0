//! stop-herald: session-end hook for AI coding assistants.
//!
//! Logs the session event, then picks the best available LLM to phrase a
//! completion message and the best available voice to speak it. Every
//! backend is optional and every failure is silent.

pub mod backends;
pub mod cascade;
pub mod config;
pub mod environment;
pub mod error;
pub mod history;
pub mod hook;
pub mod prompts;
pub mod recorder;

pub use config::Config;
pub use environment::Environment;
pub use hook::Hook;
