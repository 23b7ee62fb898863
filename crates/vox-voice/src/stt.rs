use crate::error::SpeechError;
use crate::uploader::Uploader;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use vox_types::{Language, Transcript};

/// Maximum audio input size for recognition (10 MiB), the inline-content
/// limit of the synchronous recognize call.
const MAX_STT_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Sample rate of the recording command.
const SAMPLE_RATE_HERTZ: u32 = 16_000;

/// Turns submitted audio into text.
///
/// Call `submit` with the recorded audio, then `recognize`. `Ok(None)` from
/// `recognize` means nothing usable was heard, which is a normal outcome.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    async fn submit(&self, audio: Vec<u8>) -> Result<(), SpeechError>;

    async fn recognize(&self, language: Language) -> Result<Option<Transcript>, SpeechError>;
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Default, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Default, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f64,
}

/// Google Speech-to-Text over the REST API. Expects 16 kHz FLAC.
pub struct GoogleStt {
    url: String,
    uploader: Arc<dyn Uploader>,
    pending: Mutex<Option<Vec<u8>>>,
}

impl GoogleStt {
    /// `url` is the full endpoint including the `key` query parameter.
    pub fn new(url: impl Into<String>, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            url: url.into(),
            uploader,
            pending: Mutex::new(None),
        }
    }

    fn take_pending(&self) -> Result<Vec<u8>, SpeechError> {
        self.pending
            .lock()
            .map_err(|_| SpeechError::Stt("Pending audio lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| SpeechError::Stt("No audio submitted for recognition".to_string()))
    }
}

#[async_trait]
impl RecognitionBackend for GoogleStt {
    async fn submit(&self, audio: Vec<u8>) -> Result<(), SpeechError> {
        if audio.len() > MAX_STT_INPUT_BYTES {
            return Err(SpeechError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio.len(),
                MAX_STT_INPUT_BYTES
            )));
        }

        *self
            .pending
            .lock()
            .map_err(|_| SpeechError::Stt("Pending audio lock poisoned".to_string()))? = Some(audio);
        Ok(())
    }

    async fn recognize(&self, language: Language) -> Result<Option<Transcript>, SpeechError> {
        let audio = self.take_pending()?;
        let request = serde_json::json!({
            "config": {
                "encoding": "FLAC",
                "sampleRateHertz": SAMPLE_RATE_HERTZ,
                "languageCode": language.code(),
            },
            "audio": {
                "content": base64::engine::general_purpose::STANDARD.encode(&audio),
            },
        });

        let body = self.uploader.upload_data(&self.url, &request.to_string()).await?;
        let response: RecognizeResponse = serde_json::from_str(&body)
            .map_err(|e| SpeechError::Stt(format!("Malformed recognition response: {}", e)))?;

        tracing::debug!(results = response.results.len(), "received recognition results");

        let transcript = response
            .results
            .into_iter()
            .flat_map(|result| result.alternatives)
            .find(|alternative| !alternative.transcript.is_empty())
            .map(|alternative| {
                Transcript::from_confidence(alternative.transcript, alternative.confidence)
            });

        Ok(transcript)
    }
}

impl std::fmt::Debug for GoogleStt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleStt").finish_non_exhaustive()
    }
}
