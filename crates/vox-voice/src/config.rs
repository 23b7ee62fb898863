use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Google Text-to-Speech REST endpoint.
pub const DEFAULT_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Default Google Speech-to-Text REST endpoint.
pub const DEFAULT_STT_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";

fn default_tts_url() -> String {
    DEFAULT_TTS_URL.to_string()
}

fn default_stt_url() -> String {
    DEFAULT_STT_URL.to_string()
}

/// Credentials and endpoints of the remote voice service.
#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_tts_url")]
    pub tts_url: String,
    #[serde(default = "default_stt_url")]
    pub stt_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            tts_url: default_tts_url(),
            stt_url: default_stt_url(),
        }
    }
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &"[REDACTED]")
            .field("tts_url", &self.tts_url)
            .field("stt_url", &self.stt_url)
            .finish()
    }
}

impl GoogleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Synthesis URL with the API key attached.
    pub fn synthesis_url(&self) -> String {
        format!("{}?key={}", self.tts_url, self.api_key)
    }

    /// Recognition URL with the API key attached.
    pub fn recognition_url(&self) -> String {
        format!("{}?key={}", self.stt_url, self.api_key)
    }
}
