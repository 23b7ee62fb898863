//! vox binary: speak, listen and hold a short spoken exchange.
//!
//! Loads configuration, initializes structured logging and runs one command
//! against a speech session. Ctrl+C aborts a command that is still waiting
//! on playback or recognition.

mod config;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use vox_types::{Gender, Language, VoiceSelector};
use vox_voice::{Session, SessionConfig, SessionResolver, SpeechError};

/// Text to speech and speech to text from the command line
#[derive(Parser)]
#[command(name = "vox", version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Speak text with the configured voice
    Speak {
        /// Text to speak
        text: String,
        /// Voice variant, falls back to 1 if unknown
        #[arg(long)]
        variant: Option<u8>,
        /// Voice gender (female, male)
        #[arg(long)]
        gender: Option<Gender>,
        /// Voice language (polish, english, german)
        #[arg(long)]
        language: Option<Language>,
    },
    /// Record until something is recognized and print it
    Listen {
        /// Recognition language (polish, english, german)
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Speak a prompt, listen for an answer and repeat it back
    Converse {
        /// Prompt spoken before listening
        #[arg(default_value = "I am listening, say something")]
        prompt: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("interrupted")]
    Interrupted,
}

fn resolve_config_path(cli_path: Option<&str>) -> (Option<String>, &'static str) {
    if let Some(path) = cli_path.filter(|value| !value.trim().is_empty()) {
        return (Some(path.to_string()), "cli-arg");
    }

    if let Ok(path) = std::env::var("VOX_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (resolved_config_path, config_source) = resolve_config_path(cli.config.as_deref());
    let selected_config_path = resolved_config_path.as_deref().or(Some("vox.toml"));

    let config = match config::load_config(selected_config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("vox: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::debug!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved configuration path"
    );

    let result = tokio::select! {
        result = run(cli.command, config) => result,
        () = interrupt() => Err(CliError::Interrupted),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: config::Config) -> Result<(), CliError> {
    let resolver =
        SessionResolver::new(config.google.clone()).with_audio_dir(config.audio.dir.clone());

    match command {
        Command::Speak {
            text,
            variant,
            gender,
            language,
        } => {
            let voice = VoiceSelector::new(
                language.unwrap_or(config.voice.language),
                gender.unwrap_or(config.voice.gender),
                variant.unwrap_or(config.voice.variant),
            );
            let session = resolver.resolve(SessionConfig::minimal(voice))?;
            if !session.speak(&text).await? {
                tracing::warn!("speech was not played");
            }
            Ok(())
        }
        Command::Listen { language } => {
            let session = listening_session(&resolver, &config)?;
            let transcript = match language {
                Some(language) => session.listen_in(language).await?,
                None => session.listen().await?,
            };
            println!("{} ({}%)", transcript.text, transcript.confidence);
            Ok(())
        }
        Command::Converse { prompt } => {
            let session = listening_session(&resolver, &config)?;
            converse(&session, &prompt).await
        }
    }
}

fn listening_session(
    resolver: &SessionResolver,
    config: &config::Config,
) -> Result<Session, SpeechError> {
    resolver.resolve(
        SessionConfig::minimal(config.voice).with_recognition(config.recognition.clone()),
    )
}

async fn converse(session: &Session, prompt: &str) -> Result<(), CliError> {
    session.speak(prompt).await?;

    let transcript = session.listen().await?;
    tracing::info!(
        text = %transcript.text,
        confidence = transcript.confidence,
        "heard answer"
    );
    println!("{} ({}%)", transcript.text, transcript.confidence);

    session
        .speak_async(&format!(
            "I am {} percent sure you said: {}",
            transcript.confidence, transcript.text
        ))
        .await;
    session.wait_spoken().await;
    Ok(())
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal.
async fn interrupt() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, aborting"); }
        () = terminate => { tracing::info!("received SIGTERM, aborting"); }
    }
}
