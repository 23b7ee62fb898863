//! Voice selection and recognition result types.
//!
//! A `VoiceSelector` is what a caller asks for; a `VoiceDescriptor` is what
//! the voice catalog resolves it to. Descriptors are only ever produced by
//! the catalog.

use crate::{Gender, Language};
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_variant() -> u8 {
    1
}

/// Caller-specified voice identity.
///
/// Not guaranteed to exist in a catalog: unknown variants fall back to
/// variant `1` of the same language and gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoiceSelector {
    pub language: Language,
    pub gender: Gender,
    /// 1-based variant number within the `(language, gender)` pair.
    #[serde(default = "default_variant")]
    pub variant: u8,
}

impl VoiceSelector {
    pub const fn new(language: Language, gender: Gender, variant: u8) -> Self {
        Self {
            language,
            gender,
            variant,
        }
    }

    /// Returns the variant-1 selector of the same language and gender.
    pub const fn fallback(self) -> Self {
        Self::new(self.language, self.gender, 1)
    }
}

impl Default for VoiceSelector {
    fn default() -> Self {
        Self::new(Language::Polish, Gender::Female, 1)
    }
}

impl fmt::Display for VoiceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.language, self.gender, self.variant)
    }
}

/// Backend-specific resolved voice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// Locale code, e.g. `pl-PL`.
    pub locale_code: String,
    /// Backend voice name, e.g. `pl-PL-Standard-E`.
    pub voice_name: String,
    /// SSML gender tag, e.g. `FEMALE`.
    pub gender_tag: String,
}

impl VoiceDescriptor {
    pub fn new(
        locale_code: impl Into<String>,
        voice_name: impl Into<String>,
        gender_tag: impl Into<String>,
    ) -> Self {
        Self {
            locale_code: locale_code.into(),
            voice_name: voice_name.into(),
            gender_tag: gender_tag.into(),
        }
    }
}

/// Renders as `locale/name/gender`, the form used in session logs.
impl fmt::Display for VoiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.locale_code, self.voice_name, self.gender_tag
        )
    }
}

/// Recognized speech.
///
/// `text` is never empty when produced by a listening session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    /// Confidence percentage in `0..=100`.
    pub confidence: u8,
}

impl Transcript {
    /// Builds a transcript from a backend confidence in `0.0..=1.0`.
    ///
    /// The confidence is rounded to the nearest percent and clamped.
    pub fn from_confidence(text: impl Into<String>, confidence: f64) -> Self {
        let percent = (confidence * 100.0).round().clamp(0.0, 100.0);
        Self {
            text: text.into(),
            confidence: percent as u8,
        }
    }
}
