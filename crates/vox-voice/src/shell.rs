use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Silence interval used by the recording command when none is configured.
pub const DEFAULT_SILENCE_INTERVAL: &str = "2.0t";

/// Runs shell commands for audio playback and recording.
///
/// Failure is reported as `false`, never as an error.
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    async fn run(&self, command: &str) -> bool;
}

/// Runs commands through `bash -c`.
///
/// The child is killed if the returned future is dropped, so cancelling a
/// playback stops the player process.
#[derive(Debug, Clone)]
pub struct BashShell {
    shell: String,
}

impl Default for BashShell {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }
}

impl BashShell {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

#[async_trait]
impl ShellExecutor for BashShell {
    async fn run(&self, command: &str) -> bool {
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(shell = %self.shell, error = %e, "failed to spawn shell");
                return false;
            }
        };

        match child.wait_with_output().await {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::warn!(
                    command,
                    status = %output.status,
                    stderr = %stderr.trim(),
                    "shell command failed"
                );
                false
            }
            Err(e) => {
                tracing::warn!(command, error = %e, "failed to wait for shell command");
                false
            }
        }
    }
}

/// Command that plays the staged file on the default ALSA device.
pub fn play_command(file: &Path) -> String {
    format!("play --no-show-progress {} --type alsa", file.display())
}

/// Command that records from the default ALSA device into `file` until
/// `interval` of silence follows speech.
///
/// An empty `interval` selects `DEFAULT_SILENCE_INTERVAL`.
pub fn recording_command(file: &Path, interval: &str) -> String {
    let interval = if interval.trim().is_empty() {
        DEFAULT_SILENCE_INTERVAL
    } else {
        interval
    };
    format!(
        "sox --no-show-progress --type alsa default --rate 16k --channels 1 {} silence -l 1 1 2.0% 1 {} 1.0% pad 0.3 0.2",
        file.display(),
        interval
    )
}
