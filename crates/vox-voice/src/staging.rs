//! Scoped scratch directory holding one playback artifact.

use crate::error::SpeechError;
use crate::log::Logger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

/// File name of the staged playback artifact.
pub const PLAYBACK_FILE: &str = "playback.mp3";

const ORIGIN: &str = "vox_voice::staging";

/// Owns the directory that playback (and recording) files are written to.
///
/// The directory is created on `acquire` and removed when the staging area is
/// dropped, unless it already existed: a directory this instance did not
/// create is never removed.
pub struct AudioStagingArea {
    file: PathBuf,
    dir: PathBuf,
    pre_existing: bool,
    logger: Arc<dyn Logger>,
}

impl AudioStagingArea {
    /// Creates the parent directory of `file`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Io` if the directory cannot be created.
    pub fn acquire(file: impl Into<PathBuf>, logger: Arc<dyn Logger>) -> Result<Self, SpeechError> {
        let file = file.into();
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                SpeechError::Config(format!("staging file has no parent directory: {:?}", file))
            })?;

        let pre_existing = dir.is_dir();
        if pre_existing {
            logger.log(
                Level::WARN,
                ORIGIN,
                &format!("Cannot create already existing directory: '{}'", dir.display()),
            );
        } else {
            std::fs::create_dir_all(&dir)?;
            logger.log(
                Level::DEBUG,
                ORIGIN,
                &format!("Created directory: '{}'", dir.display()),
            );
        }

        Ok(Self {
            file,
            dir,
            pre_existing,
            logger,
        })
    }

    /// Overwrites the staged file.
    pub fn write(&self, bytes: &[u8]) -> Result<(), SpeechError> {
        std::fs::write(&self.file, bytes)?;
        self.logger.log(
            Level::DEBUG,
            ORIGIN,
            &format!(
                "Written data of size: {}, to file: '{}'",
                bytes.len(),
                self.file.display()
            ),
        );
        Ok(())
    }

    /// Path of the staged playback file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the directory existed before this staging area was acquired.
    pub fn pre_existing(&self) -> bool {
        self.pre_existing
    }
}

impl Drop for AudioStagingArea {
    fn drop(&mut self) {
        if self.pre_existing {
            self.logger.log(
                Level::WARN,
                ORIGIN,
                &format!(
                    "Not removing previously existed directory: '{}'",
                    self.dir.display()
                ),
            );
            return;
        }

        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => self.logger.log(
                Level::DEBUG,
                ORIGIN,
                &format!("Removed directory: '{}'", self.dir.display()),
            ),
            Err(e) => self.logger.log(
                Level::ERROR,
                ORIGIN,
                &format!("Cannot remove directory '{}': {}", self.dir.display(), e),
            ),
        }
    }
}

impl std::fmt::Debug for AudioStagingArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStagingArea")
            .field("file", &self.file)
            .field("pre_existing", &self.pre_existing)
            .finish()
    }
}
