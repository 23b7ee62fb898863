use base64::Engine;
use std::sync::Arc;
use vox_types::{Gender, Language, VoiceDescriptor};
use vox_voice::{
    GoogleConfig, GoogleStt, GoogleTts, HttpUploader, RecognitionBackend, SpeechError,
    SynthesisBackend, Uploader,
};
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn google_config(server: &MockServer) -> GoogleConfig {
    GoogleConfig {
        api_key: "test-key".to_string(),
        tts_url: format!("{}/v1/text:synthesize", server.uri()),
        stt_url: format!("{}/v1/speech:recognize", server.uri()),
    }
}

fn uploader() -> Arc<HttpUploader> {
    Arc::new(HttpUploader::new().expect("http client"))
}

#[tokio::test]
async fn test_upload_data_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({ "hello": "world" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
        .expect(1)
        .mount(&server)
        .await;

    let body = uploader()
        .upload_data(&format!("{}/echo", server.uri()), r#"{"hello":"world"}"#)
        .await
        .expect("upload");
    assert_eq!(body, "{\"ok\":true}");
}

#[tokio::test]
async fn test_upload_file_sends_flac() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recognize"))
        .and(header("content-type", "audio/x-flac; rate=16000;"))
        .respond_with(ResponseTemplate::new(200).set_body_string("heard"))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("recording.flac");
    std::fs::write(&file, b"fLaC").unwrap();

    let body = uploader()
        .upload_file(&format!("{}/recognize", server.uri()), &file)
        .await
        .expect("upload");
    assert_eq!(body, "heard");
}

#[tokio::test]
async fn test_download_file_encodes_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .and(query_param("q", "dzień dobry & witaj"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let dest = temp.path().join("out.mp3");

    uploader()
        .download_file(&format!("{}/tts?q=", server.uri()), "dzień dobry & witaj", &dest)
        .await
        .expect("download");
    assert_eq!(std::fs::read(&dest).unwrap(), b"ID3audio");
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let result = uploader()
        .upload_data(&format!("{}/anything", server.uri()), "{}")
        .await;
    match result {
        Err(SpeechError::Transport(msg)) => {
            assert!(msg.contains("403"));
            assert!(msg.contains("API key not valid"));
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_google_tts_request_and_decoding() {
    let server = MockServer::start().await;
    let audio = base64::engine::general_purpose::STANDARD.encode(b"ID3mp3");
    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "input": { "text": "Dzień dobry" },
            "voice": {
                "languageCode": "pl-PL",
                "name": "pl-PL-Standard-E",
                "ssmlGender": "FEMALE"
            },
            "audioConfig": { "audioEncoding": "MP3" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "audioContent": audio })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = google_config(&server);
    let tts = GoogleTts::new(config.synthesis_url(), uploader());
    let voice = VoiceDescriptor::new(Language::Polish.code(), "pl-PL-Standard-E", Gender::Female.ssml_tag());

    let bytes = tts.synthesize("Dzień dobry", &voice).await.expect("synthesize");
    assert_eq!(bytes, b"ID3mp3");
}

#[tokio::test]
async fn test_google_tts_rejects_missing_audio() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let tts = GoogleTts::new(google_config(&server).synthesis_url(), uploader());
    let voice = VoiceDescriptor::new("en-US", "en-US-Standard-C", "FEMALE");

    let result = tts.synthesize("hello", &voice).await;
    assert!(matches!(result, Err(SpeechError::Tts(_))));
}

#[tokio::test]
async fn test_google_stt_request_and_parsing() {
    let server = MockServer::start().await;
    let content = base64::engine::general_purpose::STANDARD.encode(b"fLaC");
    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "config": {
                "encoding": "FLAC",
                "sampleRateHertz": 16000,
                "languageCode": "en-US"
            },
            "audio": { "content": content }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "alternatives": [ { "transcript": "hello there", "confidence": 0.912 } ] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stt = GoogleStt::new(google_config(&server).recognition_url(), uploader());
    stt.submit(b"fLaC".to_vec()).await.expect("submit");
    let transcript = stt
        .recognize(Language::English)
        .await
        .expect("recognize")
        .expect("transcript");

    assert_eq!(transcript.text, "hello there");
    assert_eq!(transcript.confidence, 91);
}

#[tokio::test]
async fn test_google_stt_without_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let stt = GoogleStt::new(google_config(&server).recognition_url(), uploader());
    stt.submit(b"fLaC".to_vec()).await.expect("submit");
    assert_eq!(stt.recognize(Language::Polish).await.expect("recognize"), None);

    // Audio is consumed by a recognition attempt.
    assert!(matches!(
        stt.recognize(Language::Polish).await,
        Err(SpeechError::Stt(_))
    ));
}
