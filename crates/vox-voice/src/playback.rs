//! Single-flight synchronous speech.
//!
//! A coordinator is either idle or speaking. `speak` claims the busy flag
//! with a compare-and-swap and gives up immediately if another call holds it:
//! duplicate requests are rejected, never queued. The flag is released by a
//! guard, so errors and cancellation also return the coordinator to idle.
//!
//! Cancellation is checked before synthesis, before staging and while the
//! player runs. An in-flight HTTP request is not guaranteed to abort.

use crate::catalog::VoiceCatalog;
use crate::error::SpeechError;
use crate::log::Logger;
use crate::shell::{play_command, ShellExecutor};
use crate::staging::AudioStagingArea;
use crate::tts::SynthesisBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::Level;
use vox_types::{VoiceDescriptor, VoiceSelector};

const ORIGIN: &str = "vox_voice::playback";

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
struct CurrentVoice {
    selector: VoiceSelector,
    descriptor: VoiceDescriptor,
}

pub struct PlaybackCoordinator {
    catalog: &'static VoiceCatalog,
    synthesis: Arc<dyn SynthesisBackend>,
    shell: Arc<dyn ShellExecutor>,
    staging: Arc<AudioStagingArea>,
    logger: Arc<dyn Logger>,
    voice: RwLock<CurrentVoice>,
    speaking: AtomicBool,
}

impl PlaybackCoordinator {
    /// # Errors
    ///
    /// Returns `SpeechError::VoiceNotFound` if `voice` cannot be resolved.
    pub fn new(
        catalog: &'static VoiceCatalog,
        voice: VoiceSelector,
        synthesis: Arc<dyn SynthesisBackend>,
        shell: Arc<dyn ShellExecutor>,
        staging: Arc<AudioStagingArea>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, SpeechError> {
        let descriptor = catalog.resolve(&voice)?.clone();
        Ok(Self {
            catalog,
            synthesis,
            shell,
            staging,
            logger,
            voice: RwLock::new(CurrentVoice {
                selector: voice,
                descriptor,
            }),
            speaking: AtomicBool::new(false),
        })
    }

    /// Speaks `text` with the current voice, or with `voice` for this call only.
    ///
    /// Returns `Ok(false)` if another `speak` is in progress or if `cancel`
    /// fired before playback finished. Synthesis and staging failures are
    /// returned as errors.
    pub async fn speak(
        &self,
        text: &str,
        voice: Option<VoiceSelector>,
        cancel: &CancellationToken,
    ) -> Result<bool, SpeechError> {
        let Some(_busy) = BusyGuard::try_acquire(&self.speaking) else {
            self.log(
                Level::WARN,
                &format!("Cannot speak text: '{}', tts in use", text),
            );
            return Ok(false);
        };

        self.log(Level::DEBUG, &format!("Requested text to speak: '{}'", text));

        let descriptor = match voice {
            Some(selector) => {
                let descriptor = self.catalog.resolve(&selector)?.clone();
                self.log(Level::DEBUG, &format!("Text spoken as {}", descriptor));
                descriptor
            }
            None => self.descriptor(),
        };

        if cancel.is_cancelled() {
            return Ok(self.cancelled(text));
        }
        let audio = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(self.cancelled(text)),
            audio = self.synthesis.synthesize(text, &descriptor) => audio?,
        };

        if cancel.is_cancelled() {
            return Ok(self.cancelled(text));
        }
        self.staging.write(&audio)?;

        let command = play_command(self.staging.file());
        let played = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(self.cancelled(text)),
            played = self.shell.run(&command) => played,
        };
        if !played {
            self.log(Level::WARN, &format!("Playback command failed: {}", command));
        }

        Ok(true)
    }

    /// Whether a `speak` call currently holds the busy flag.
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }

    /// Replaces the current voice.
    ///
    /// Not coordinated with an in-flight `speak`, which keeps the voice it
    /// resolved when it started.
    pub fn set_voice(&self, selector: VoiceSelector) -> Result<(), SpeechError> {
        let descriptor = self.catalog.resolve(&selector)?.clone();
        self.log(Level::DEBUG, &format!("Setting voice to: {}", descriptor));
        let mut current = self.voice.write().unwrap_or_else(|e| e.into_inner());
        *current = CurrentVoice {
            selector,
            descriptor,
        };
        Ok(())
    }

    /// The selector last passed to `set_voice` (or the construction voice).
    pub fn voice(&self) -> VoiceSelector {
        self.voice.read().unwrap_or_else(|e| e.into_inner()).selector
    }

    /// The descriptor the current selector resolved to.
    pub fn descriptor(&self) -> VoiceDescriptor {
        self.voice
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .descriptor
            .clone()
    }

    fn cancelled(&self, text: &str) -> bool {
        self.log(Level::DEBUG, &format!("Speaking text: '{}' was cancelled", text));
        false
    }

    fn log(&self, level: Level, message: &str) {
        self.logger.log(level, ORIGIN, message);
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("voice", &self.voice())
            .field("speaking", &self.is_speaking())
            .finish_non_exhaustive()
    }
}
