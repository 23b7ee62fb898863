use crate::error::SpeechError;
use crate::uploader::Uploader;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::sync::Arc;
use vox_types::VoiceDescriptor;

/// Maximum text input size for synthesis (5000 bytes, the service limit).
/// Longer input is rejected before any request is sent.
pub const MAX_TTS_INPUT_BYTES: usize = 5000;

/// Turns text into encoded audio for a resolved voice.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceDescriptor) -> Result<Vec<u8>, SpeechError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

/// Google Text-to-Speech over the REST API. Produces MP3.
pub struct GoogleTts {
    url: String,
    uploader: Arc<dyn Uploader>,
}

impl GoogleTts {
    /// `url` is the full endpoint including the `key` query parameter.
    pub fn new(url: impl Into<String>, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            url: url.into(),
            uploader,
        }
    }
}

#[async_trait]
impl SynthesisBackend for GoogleTts {
    async fn synthesize(&self, text: &str, voice: &VoiceDescriptor) -> Result<Vec<u8>, SpeechError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(SpeechError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let request = serde_json::json!({
            "input": { "text": text },
            "voice": {
                "languageCode": voice.locale_code,
                "name": voice.voice_name,
                "ssmlGender": voice.gender_tag,
            },
            "audioConfig": { "audioEncoding": "MP3" },
        });

        let body = self.uploader.upload_data(&self.url, &request.to_string()).await?;

        let response: SynthesizeResponse = serde_json::from_str(&body)
            .map_err(|e| SpeechError::Tts(format!("Malformed synthesis response: {}", e)))?;
        let encoded = response
            .audio_content
            .ok_or_else(|| SpeechError::Tts("Synthesis response has no audioContent".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| SpeechError::Tts(format!("Failed to decode audioContent: {}", e)))
    }
}

impl std::fmt::Debug for GoogleTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTts").finish_non_exhaustive()
    }
}
