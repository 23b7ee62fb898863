//! Speech session coordination for vox.
//!
//! Speaks text through a remote synthesis service and captures spoken input
//! through a remote recognition service, while coordinating the local side:
//! audio staging, playback and recording through shell commands.
//!
//! The pieces, leaves first:
//!
//! - [`VoiceCatalog`] resolves a requested voice, falling back to variant 1.
//! - [`AudioStagingArea`] owns the scratch directory for playback files.
//! - [`SessionResolver`] turns a [`SessionConfig`] into a [`Session`].
//! - [`PlaybackCoordinator`] runs one `speak` at a time and rejects overlap.
//! - [`AsyncTaskManager`] holds the single background speech task.
//! - [`RecognitionLoop`] records and recognizes until it hears something.
//!
//! ```rust,ignore
//! use vox_voice::{GoogleConfig, SessionConfig, SessionResolver};
//! use vox_types::{Gender, Language, VoiceSelector};
//!
//! let resolver = SessionResolver::new(GoogleConfig::new(api_key));
//! let session = resolver.resolve(SessionConfig::minimal(VoiceSelector::new(
//!     Language::English,
//!     Gender::Female,
//!     1,
//! )))?;
//! session.speak("Hello").await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod log;
pub mod playback;
pub mod recognition;
pub mod session;
pub mod shell;
pub mod staging;
pub mod stt;
pub mod tasks;
pub mod tts;
pub mod uploader;

pub use catalog::VoiceCatalog;
pub use config::GoogleConfig;
pub use error::SpeechError;
pub use log::{Logger, TracingLogger};
pub use playback::PlaybackCoordinator;
pub use recognition::{RecognitionLoop, RecognitionSettings, RECORDING_FILE};
pub use session::{
    FullConfig, MinimalConfig, Session, SessionConfig, SessionResolver, DEFAULT_AUDIO_DIR,
};
pub use shell::{BashShell, ShellExecutor, DEFAULT_SILENCE_INTERVAL};
pub use staging::{AudioStagingArea, PLAYBACK_FILE};
pub use stt::{GoogleStt, RecognitionBackend};
pub use tasks::AsyncTaskManager;
pub use tts::{GoogleTts, SynthesisBackend};
pub use uploader::{HttpUploader, Uploader};
