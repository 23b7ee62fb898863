//! Speech sessions and the resolver that builds them.
//!
//! A `SessionResolver` is the composition root: it owns the service
//! credentials, the audio directory and the background task slot shared by
//! every session it builds. `resolve` turns a `SessionConfig` into a
//! `Session`, substituting default collaborators for a minimal config.
//!
//! Background speech (`speak_async`) holds only a weak reference to the
//! session. If the session is dropped before the task runs, the task does
//! nothing.

use crate::catalog::VoiceCatalog;
use crate::config::GoogleConfig;
use crate::error::SpeechError;
use crate::log::{Logger, TracingLogger};
use crate::playback::PlaybackCoordinator;
use crate::recognition::{RecognitionLoop, RecognitionSettings};
use crate::shell::{BashShell, ShellExecutor};
use crate::staging::{AudioStagingArea, PLAYBACK_FILE};
use crate::stt::GoogleStt;
use crate::tasks::AsyncTaskManager;
use crate::tts::GoogleTts;
use crate::uploader::{HttpUploader, Uploader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;
use tracing::Level;
use vox_types::{Language, Transcript, VoiceDescriptor, VoiceSelector};

/// Default directory for staged audio, relative to the working directory.
pub const DEFAULT_AUDIO_DIR: &str = "audio";

const ORIGIN: &str = "vox_voice::session";

/// Session built with default shell and uploader.
#[derive(Clone, Default)]
pub struct MinimalConfig {
    pub voice: VoiceSelector,
    pub logger: Option<Arc<dyn Logger>>,
    pub recognition: Option<RecognitionSettings>,
}

/// Session built with caller-supplied collaborators.
#[derive(Clone)]
pub struct FullConfig {
    pub voice: VoiceSelector,
    pub shell: Arc<dyn ShellExecutor>,
    pub uploader: Arc<dyn Uploader>,
    pub logger: Option<Arc<dyn Logger>>,
    pub recognition: Option<RecognitionSettings>,
}

/// Tagged session configuration.
///
/// `Unset` is the empty configuration; resolving it is an error.
#[derive(Clone, Default)]
pub enum SessionConfig {
    #[default]
    Unset,
    Minimal(MinimalConfig),
    Full(FullConfig),
}

impl SessionConfig {
    pub fn minimal(voice: VoiceSelector) -> Self {
        Self::Minimal(MinimalConfig {
            voice,
            ..MinimalConfig::default()
        })
    }

    pub fn full(
        voice: VoiceSelector,
        shell: Arc<dyn ShellExecutor>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        Self::Full(FullConfig {
            voice,
            shell,
            uploader,
            logger: None,
            recognition: None,
        })
    }

    /// Sets the logger of a `Minimal` or `Full` config.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        match &mut self {
            Self::Minimal(config) => config.logger = Some(logger),
            Self::Full(config) => config.logger = Some(logger),
            Self::Unset => {}
        }
        self
    }

    /// Makes the session recognition-capable.
    pub fn with_recognition(mut self, settings: RecognitionSettings) -> Self {
        match &mut self {
            Self::Minimal(config) => config.recognition = Some(settings),
            Self::Full(config) => config.recognition = Some(settings),
            Self::Unset => {}
        }
        self
    }
}

struct Collaborators {
    voice: VoiceSelector,
    shell: Arc<dyn ShellExecutor>,
    uploader: Arc<dyn Uploader>,
    logger: Arc<dyn Logger>,
    recognition: Option<RecognitionSettings>,
}

/// Builds sessions that share one background task slot.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    google: GoogleConfig,
    audio_dir: PathBuf,
    catalog: &'static VoiceCatalog,
    tasks: AsyncTaskManager,
}

impl SessionResolver {
    pub fn new(google: GoogleConfig) -> Self {
        Self {
            google,
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
            catalog: VoiceCatalog::standard(),
            tasks: AsyncTaskManager::new(),
        }
    }

    /// Stages audio in `dir` instead of `DEFAULT_AUDIO_DIR`.
    ///
    /// Every session built by this resolver stages in the same directory.
    /// The session that created it removes it when dropped, even while other
    /// sessions still use it, so sessions meant to outlive each other need
    /// resolvers with different directories.
    pub fn with_audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.audio_dir = dir.into();
        self
    }

    /// Shares `tasks` instead of a slot of its own.
    pub fn with_tasks(mut self, tasks: AsyncTaskManager) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn tasks(&self) -> &AsyncTaskManager {
        &self.tasks
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Builds a session from `config`.
    ///
    /// # Errors
    ///
    /// - `SpeechError::Config` for `SessionConfig::Unset` or a missing API key
    /// - `SpeechError::Io` if the staging directory cannot be created
    /// - `SpeechError::VoiceNotFound` if the voice cannot be resolved
    ///
    /// The staging directory is released again if a later step fails.
    pub fn resolve(&self, config: SessionConfig) -> Result<Session, SpeechError> {
        let parts = match config {
            SessionConfig::Minimal(config) => Collaborators {
                voice: config.voice,
                shell: Arc::new(BashShell::default()),
                uploader: Arc::new(HttpUploader::new()?),
                logger: config.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
                recognition: config.recognition,
            },
            SessionConfig::Full(config) => Collaborators {
                voice: config.voice,
                shell: config.shell,
                uploader: config.uploader,
                logger: config.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
                recognition: config.recognition,
            },
            SessionConfig::Unset => {
                return Err(SpeechError::Config(
                    "session config not supported".to_string(),
                ))
            }
        };

        let staging = Arc::new(AudioStagingArea::acquire(
            self.audio_dir.join(PLAYBACK_FILE),
            Arc::clone(&parts.logger),
        )?);

        if !self.google.has_key() {
            return Err(SpeechError::Config(
                "Cannot get TTS key from config".to_string(),
            ));
        }

        let synthesis = Arc::new(GoogleTts::new(
            self.google.synthesis_url(),
            Arc::clone(&parts.uploader),
        ));
        let playback = PlaybackCoordinator::new(
            self.catalog,
            parts.voice,
            synthesis,
            Arc::clone(&parts.shell),
            Arc::clone(&staging),
            Arc::clone(&parts.logger),
        )?;

        let recognition = parts.recognition.as_ref().map(|settings| {
            let backend = Arc::new(GoogleStt::new(
                self.google.recognition_url(),
                Arc::clone(&parts.uploader),
            ));
            RecognitionLoop::new(
                settings,
                Arc::clone(&parts.shell),
                backend,
                Arc::clone(&staging),
                Arc::clone(&parts.logger),
            )
        });

        parts.logger.log(
            Level::INFO,
            ORIGIN,
            &format!(
                "Created speech session [langcode/langname/gender]: {}",
                playback.descriptor()
            ),
        );

        Ok(Session {
            inner: Arc::new(SessionInner {
                playback,
                recognition,
                logger: parts.logger,
            }),
            tasks: self.tasks.clone(),
        })
    }
}

struct SessionInner {
    playback: PlaybackCoordinator,
    recognition: Option<RecognitionLoop>,
    logger: Arc<dyn Logger>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.logger.log(
            Level::INFO,
            ORIGIN,
            &format!(
                "Released speech session [langcode/langname/gender]: {}",
                self.playback.descriptor()
            ),
        );
    }
}

/// A speaker (and optionally a listener) bound to one voice.
///
/// Dropping the session releases its staging directory once any background
/// task using it has finished.
pub struct Session {
    inner: Arc<SessionInner>,
    tasks: AsyncTaskManager,
}

impl Session {
    /// Speaks `text` with the current voice and returns once playback ends.
    ///
    /// Returns `Ok(false)` without doing anything if this session is already
    /// speaking.
    pub async fn speak(&self, text: &str) -> Result<bool, SpeechError> {
        self.inner
            .playback
            .speak(text, None, &CancellationToken::new())
            .await
    }

    /// Like `speak`, with `voice` used for this call only.
    pub async fn speak_with(&self, text: &str, voice: VoiceSelector) -> Result<bool, SpeechError> {
        self.inner
            .playback
            .speak(text, Some(voice), &CancellationToken::new())
            .await
    }

    /// Speaks `text` in the background, replacing any pending background speech.
    pub async fn speak_async(&self, text: &str) -> bool {
        self.schedule(text, None).await
    }

    /// Like `speak_async`, with `voice` used for this call only.
    pub async fn speak_async_with(&self, text: &str, voice: VoiceSelector) -> bool {
        self.schedule(text, Some(voice)).await
    }

    /// Waits until background speech has finished.
    ///
    /// Returns `false` if nothing was pending.
    pub async fn wait_spoken(&self) -> bool {
        self.tasks.wait().await
    }

    pub fn voice(&self) -> VoiceSelector {
        self.inner.playback.voice()
    }

    pub fn descriptor(&self) -> VoiceDescriptor {
        self.inner.playback.descriptor()
    }

    /// Changes the voice used by later `speak` calls.
    ///
    /// Callers must not rely on this affecting a `speak` already in progress.
    pub fn set_voice(&self, voice: VoiceSelector) -> Result<(), SpeechError> {
        self.inner.playback.set_voice(voice)
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.playback.is_speaking()
    }

    /// Listens until something is recognized, in the configured language.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::RecognitionUnavailable` if the session was built
    /// without recognition settings.
    pub async fn listen(&self) -> Result<Transcript, SpeechError> {
        self.recognition()?.listen(None).await
    }

    /// Listens in `language` for this call only.
    pub async fn listen_in(&self, language: Language) -> Result<Transcript, SpeechError> {
        self.recognition()?.listen(Some(language)).await
    }

    pub fn can_listen(&self) -> bool {
        self.inner.recognition.is_some()
    }

    fn recognition(&self) -> Result<&RecognitionLoop, SpeechError> {
        self.inner
            .recognition
            .as_ref()
            .ok_or(SpeechError::RecognitionUnavailable)
    }

    async fn schedule(&self, text: &str, voice: Option<VoiceSelector>) -> bool {
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let text = text.to_string();
        self.tasks
            .create(move |cancel| async move {
                let Some(inner) = weak.upgrade() else {
                    tracing::debug!("session released before background speech started");
                    return;
                };
                if let Err(e) = inner.playback.speak(&text, voice, &cancel).await {
                    inner.logger.log(
                        Level::ERROR,
                        ORIGIN,
                        &format!("Background speech failed: {}", e),
                    );
                }
            })
            .await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("playback", &self.inner.playback)
            .field("recognition", &self.inner.recognition)
            .finish()
    }
}
