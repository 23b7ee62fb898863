//! In-memory collaborators for session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};
use tracing::Level;
use vox_voice::{GoogleConfig, Logger, ShellExecutor, SpeechError, Uploader};

pub const TTS_URL: &str = "http://tts.test/v1/text:synthesize";
pub const STT_URL: &str = "http://stt.test/v1/speech:recognize";

pub fn google_config() -> GoogleConfig {
    GoogleConfig {
        api_key: "test-key".to_string(),
        tts_url: TTS_URL.to_string(),
        stt_url: STT_URL.to_string(),
    }
}

/// A synthesis request as seen by the fake service.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisCall {
    pub text: String,
    pub language_code: String,
    pub voice_name: String,
    pub ssml_gender: String,
}

/// Fake voice service.
///
/// Synthesis answers with the request text as audio, so the staged file
/// shows which request it came from. When gated, each synthesis signals
/// `synthesis_started` and waits for `release_synthesis`. Recognition answers
/// are queued; an empty queue answers with no results.
#[derive(Default)]
pub struct FakeUploader {
    synthesis: Mutex<Vec<SynthesisCall>>,
    synthesis_gate: Option<Semaphore>,
    pub synthesis_started: Notify,
    recognition_languages: Mutex<Vec<String>>,
    recognition_replies: Mutex<VecDeque<String>>,
    fail_synthesis: AtomicBool,
    fail_recognition: AtomicBool,
}

impl FakeUploader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Synthesis blocks until `release_synthesis` is called once per request.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            synthesis_gate: Some(Semaphore::new(0)),
            ..Self::default()
        })
    }

    pub fn release_synthesis(&self) {
        if let Some(gate) = &self.synthesis_gate {
            gate.add_permits(1);
        }
    }

    pub fn queue_recognition(&self, reply: &str) {
        self.recognition_replies
            .lock()
            .unwrap()
            .push_back(reply.to_string());
    }

    pub fn fail_synthesis(&self, fail: bool) {
        self.fail_synthesis.store(fail, Ordering::SeqCst);
    }

    pub fn fail_recognition(&self, fail: bool) {
        self.fail_recognition.store(fail, Ordering::SeqCst);
    }

    pub fn synthesis_calls(&self) -> Vec<SynthesisCall> {
        self.synthesis.lock().unwrap().clone()
    }

    pub fn synthesized_texts(&self) -> Vec<String> {
        self.synthesis_calls().into_iter().map(|c| c.text).collect()
    }

    pub fn recognition_languages(&self) -> Vec<String> {
        self.recognition_languages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload_data(&self, url: &str, payload: &str) -> Result<String, SpeechError> {
        let request: Value = serde_json::from_str(payload).expect("payload is JSON");

        if url.starts_with(TTS_URL) {
            assert!(url.ends_with("?key=test-key"), "unexpected url: {}", url);
            if self.fail_synthesis.load(Ordering::SeqCst) {
                return Err(SpeechError::Transport("connection refused".to_string()));
            }
            let call = SynthesisCall {
                text: request["input"]["text"].as_str().unwrap_or_default().to_string(),
                language_code: request["voice"]["languageCode"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                voice_name: request["voice"]["name"].as_str().unwrap_or_default().to_string(),
                ssml_gender: request["voice"]["ssmlGender"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            };
            let audio = base64::engine::general_purpose::STANDARD.encode(call.text.as_bytes());
            self.synthesis.lock().unwrap().push(call);
            self.synthesis_started.notify_one();
            if let Some(gate) = &self.synthesis_gate {
                match gate.acquire().await {
                    Ok(permit) => permit.forget(),
                    Err(_) => return Err(SpeechError::Transport("gate closed".to_string())),
                }
            }
            return Ok(serde_json::json!({ "audioContent": audio }).to_string());
        }

        if url.starts_with(STT_URL) {
            if self.fail_recognition.load(Ordering::SeqCst) {
                return Err(SpeechError::Transport("connection reset".to_string()));
            }
            self.recognition_languages.lock().unwrap().push(
                request["config"]["languageCode"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            );
            let reply = self
                .recognition_replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "{}".to_string());
            return Ok(reply);
        }

        Err(SpeechError::Transport(format!("unknown url: {}", url)))
    }

    async fn upload_file(&self, _url: &str, _path: &Path) -> Result<String, SpeechError> {
        Err(SpeechError::Transport("upload_file is not used".to_string()))
    }

    async fn download_file(&self, _url: &str, _query: &str, _dest: &Path) -> Result<(), SpeechError> {
        Err(SpeechError::Transport("download_file is not used".to_string()))
    }
}

/// Fake shell.
///
/// `play` commands signal `play_started` and, when gated, wait for a permit
/// from `release`. `sox` commands write a fake recording if a path was given,
/// up to `max_recordings` times, and fail afterwards.
#[derive(Default)]
pub struct FakeShell {
    commands: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
    recording: Option<PathBuf>,
    max_recordings: Option<usize>,
    plays_finished: AtomicUsize,
    pub play_started: Notify,
}

impl FakeShell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Playback blocks until `release` is called once per play.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        })
    }

    /// Recording commands write `recording`.
    pub fn recording_to(recording: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            recording: Some(recording.into()),
            ..Self::default()
        })
    }

    /// Only the first recording command succeeds.
    pub fn recording_once(recording: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            recording: Some(recording.into()),
            max_recordings: Some(1),
            ..Self::default()
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count(&self, program: &str) -> usize {
        self.commands()
            .iter()
            .filter(|c| c.starts_with(program))
            .count()
    }

    pub fn plays_finished(&self) -> usize {
        self.plays_finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShellExecutor for FakeShell {
    async fn run(&self, command: &str) -> bool {
        self.commands.lock().unwrap().push(command.to_string());

        if command.starts_with("play ") {
            self.play_started.notify_one();
            if let Some(gate) = &self.gate {
                match gate.acquire().await {
                    Ok(permit) => permit.forget(),
                    Err(_) => return false,
                }
            }
            self.plays_finished.fetch_add(1, Ordering::SeqCst);
            return true;
        }

        if command.starts_with("sox ") {
            if self
                .max_recordings
                .is_some_and(|max| self.count("sox") > max)
            {
                return false;
            }
            if let Some(path) = &self.recording {
                return std::fs::write(path, b"fLaC").is_ok();
            }
            return false;
        }

        true
    }
}

/// Logger that keeps every message.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, m)| *l == level && m.contains(needle))
            .count()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, _origin: &str, message: &str) {
        self.entries.lock().unwrap().push((level, message.to_string()));
    }
}
