use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("Voice not found in catalog: {0}")]
    VoiceNotFound(String),

    #[error("Session was not configured for recognition")]
    RecognitionUnavailable,
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        SpeechError::Transport(err.to_string())
    }
}
