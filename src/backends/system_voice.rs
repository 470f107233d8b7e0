//! Local speech via a system command (say, spd-say, espeak-ng, espeak).
//!
//! The child is spawned with `kill_on_drop`, so dropping the attempt on
//! timeout kills it.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::SpeechBackend;
use crate::error::ProviderError;

pub struct SystemVoice {
    program: PathBuf,
}

impl SystemVoice {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// spd-say returns as soon as speech is queued unless told to wait.
    fn args<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let name = self
            .program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name == "spd-say" {
            vec!["--wait", text]
        } else {
            vec![text]
        }
    }
}

#[async_trait]
impl SpeechBackend for SystemVoice {
    async fn speak(&self, text: &str) -> Result<(), ProviderError> {
        debug!("Speaking via {}", self.program.display());

        let output = Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ProviderError::Process(format!("Failed to spawn {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Process(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::{Duration, Instant};

    use crate::cascade::{BoundedInvoker, InvocationOutcome, ProviderId};

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn spd_say_waits_for_speech() {
        let voice = SystemVoice::new(PathBuf::from("/usr/bin/spd-say"));
        assert_eq!(voice.args("hi"), vec!["--wait", "hi"]);

        let voice = SystemVoice::new(PathBuf::from("/usr/bin/espeak"));
        assert_eq!(voice.args("hi"), vec!["hi"]);
    }

    #[tokio::test]
    async fn message_is_passed_as_argument() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("spoken.txt");
        let program = script(dir.path(), "say", &format!("printf '%s' \"$1\" > {}", out.display()));

        SystemVoice::new(program).speak("All done!").await.unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "All done!");
    }

    #[tokio::test]
    async fn non_zero_exit_is_process_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "say", "echo 'no audio device' >&2; exit 3");

        match SystemVoice::new(program).speak("hi").await {
            Err(ProviderError::Process(msg)) => assert!(msg.contains("no audio device"), "{msg}"),
            other => panic!("expected Process error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hung_command_is_killed_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "say", "sleep 30");
        let voice = SystemVoice::new(program);

        let invoker = BoundedInvoker::new(Duration::from_millis(200));
        let started = Instant::now();
        let outcome = invoker
            .invoke(ProviderId::SystemVoice, async move { voice.speak("hi").await })
            .await;

        assert_eq!(outcome, InvocationOutcome::Failure("timeout".into()));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
