//! Static voice lookup with deterministic fallback.
//!
//! The catalog maps a `VoiceSelector` to the backend voice it stands for.
//! Unknown variants fall back to variant `1` of the same language and gender,
//! so every `(language, gender)` pair present must carry a variant `1` entry.
//! `from_entries` refuses tables that break this.

use crate::error::SpeechError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use vox_types::{Gender, Language, VoiceDescriptor, VoiceSelector};

static STANDARD: LazyLock<VoiceCatalog> = LazyLock::new(|| {
    use Gender::{Female, Male};
    use Language::{English, German, Polish};

    let entries = [
        (Polish, Female, 1, "pl-PL-Standard-E"),
        (Polish, Female, 2, "pl-PL-Standard-A"),
        (Polish, Female, 3, "pl-PL-Standard-D"),
        (Polish, Male, 1, "pl-PL-Standard-B"),
        (Polish, Male, 2, "pl-PL-Standard-C"),
        (English, Female, 1, "en-US-Standard-C"),
        (English, Male, 1, "en-US-Standard-A"),
        (German, Female, 1, "de-DE-Standard-C"),
        (German, Male, 1, "de-DE-Standard-B"),
    ]
    .into_iter()
    .map(|(language, gender, variant, name)| {
        (
            VoiceSelector::new(language, gender, variant),
            VoiceDescriptor::new(language.code(), name, gender.ssml_tag()),
        )
    });

    VoiceCatalog {
        voices: entries.collect(),
    }
});

/// Immutable mapping from requested voices to backend voices.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: BTreeMap<VoiceSelector, VoiceDescriptor>,
}

impl VoiceCatalog {
    /// The Google standard voices, built once per process.
    pub fn standard() -> &'static VoiceCatalog {
        &STANDARD
    }

    /// Builds a catalog from explicit entries.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Config` if some `(language, gender)` pair has no
    /// variant `1` entry to fall back to.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (VoiceSelector, VoiceDescriptor)>,
    ) -> Result<Self, SpeechError> {
        let voices: BTreeMap<_, _> = entries.into_iter().collect();

        let pairs: BTreeSet<_> = voices.keys().map(|s| (s.language, s.gender)).collect();
        for (language, gender) in pairs {
            let fallback = VoiceSelector::new(language, gender, 1);
            if !voices.contains_key(&fallback) {
                return Err(SpeechError::Config(format!(
                    "voice catalog has no fallback voice for {}",
                    fallback
                )));
            }
        }

        Ok(Self { voices })
    }

    /// Resolves a selector, falling back to variant `1`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::VoiceNotFound` when neither the selector nor its
    /// fallback is present. This is a defect in the catalog, not in the
    /// caller's request.
    pub fn resolve(&self, selector: &VoiceSelector) -> Result<&VoiceDescriptor, SpeechError> {
        self.voices
            .get(selector)
            .or_else(|| self.voices.get(&selector.fallback()))
            .ok_or_else(|| SpeechError::VoiceNotFound(selector.to_string()))
    }

    pub fn contains(&self, selector: &VoiceSelector) -> bool {
        self.voices.contains_key(selector)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
