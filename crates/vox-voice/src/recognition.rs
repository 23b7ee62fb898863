use crate::error::SpeechError;
use crate::log::Logger;
use crate::shell::{recording_command, ShellExecutor, DEFAULT_SILENCE_INTERVAL};
use crate::staging::AudioStagingArea;
use crate::stt::RecognitionBackend;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use vox_types::{Language, Transcript};

/// File name of the recording inside the staging directory.
pub const RECORDING_FILE: &str = "recording.flac";

const ORIGIN: &str = "vox_voice::recognition";

fn default_silence_interval() -> String {
    DEFAULT_SILENCE_INTERVAL.to_string()
}

/// Makes a session able to listen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionSettings {
    pub language: Language,
    /// Silence duration that ends a recording, in `sox` notation (`2.0t`).
    #[serde(default = "default_silence_interval")]
    pub silence_interval: String,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: Language::Polish,
            silence_interval: default_silence_interval(),
        }
    }
}

impl RecognitionSettings {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }
}

/// Record, submit, recognize, and retry until something is heard.
pub struct RecognitionLoop {
    language: Language,
    record_command: String,
    recording: PathBuf,
    shell: Arc<dyn ShellExecutor>,
    backend: Arc<dyn RecognitionBackend>,
    logger: Arc<dyn Logger>,
    // Holds the staging directory alive for as long as recordings land in it.
    _staging: Arc<AudioStagingArea>,
}

impl RecognitionLoop {
    pub fn new(
        settings: &RecognitionSettings,
        shell: Arc<dyn ShellExecutor>,
        backend: Arc<dyn RecognitionBackend>,
        staging: Arc<AudioStagingArea>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let recording = staging.dir().join(RECORDING_FILE);
        Self {
            language: settings.language,
            record_command: recording_command(&recording, &settings.silence_interval),
            recording,
            shell,
            backend,
            logger,
            _staging: staging,
        }
    }

    /// Listens until a non-empty transcript is recognized.
    ///
    /// `language` overrides the configured language for this call only.
    /// There is no attempt limit: silence keeps the loop recording. Transport
    /// errors and a missing recording end the loop with an error. The
    /// recording from an earlier attempt is deleted before each new one.
    pub async fn listen(&self, language: Option<Language>) -> Result<Transcript, SpeechError> {
        let language = language.unwrap_or(self.language);
        loop {
            // A failed recording must not resubmit the previous utterance.
            match tokio::fs::remove_file(&self.recording).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            self.log(
                Level::DEBUG,
                &format!("Recording voice by: {}", self.record_command),
            );
            if !self.shell.run(&self.record_command).await {
                self.log(Level::WARN, "Recording command failed");
            }

            let audio = tokio::fs::read(&self.recording).await?;
            self.backend.submit(audio).await?;
            self.log(
                Level::DEBUG,
                &format!(
                    "Uploaded audio to stt engine: {}",
                    self.recording.display()
                ),
            );

            match self.backend.recognize(language).await? {
                Some(transcript) if !transcript.text.is_empty() => {
                    self.log(
                        Level::DEBUG,
                        &format!(
                            "Returning transcript [text/confid]: '{}'/{}",
                            transcript.text, transcript.confidence
                        ),
                    );
                    return Ok(transcript);
                }
                _ => self.log(Level::DEBUG, "Cannot recognize transcript"),
            }
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The shell command used to record one utterance.
    pub fn record_command(&self) -> &str {
        &self.record_command
    }

    fn log(&self, level: Level, message: &str) {
        self.logger.log(level, ORIGIN, message);
    }
}

impl std::fmt::Debug for RecognitionLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionLoop")
            .field("language", &self.language)
            .field("recording", &self.recording)
            .finish_non_exhaustive()
    }
}
