//! Shared types for the vox speech workspace.
//!
//! This crate provides the value types passed between the speech session
//! layer, the remote backends and the command line: the language and gender
//! enums used to select a voice, the voice selector and its resolved
//! descriptor, and the recognized transcript.
//!
//! Nothing in here performs I/O. Every type is a plain value that can be
//! copied or cloned freely and serialized into configuration files.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod voice;

pub use voice::{Transcript, VoiceDescriptor, VoiceSelector};

/// Languages supported by the speech backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Polish (`pl-PL`).
    Polish,
    /// American English (`en-US`).
    English,
    /// German (`de-DE`).
    German,
}

impl Language {
    /// Returns the BCP-47 locale code used by the remote service.
    pub fn code(self) -> &'static str {
        match self {
            Self::Polish => "pl-PL",
            Self::English => "en-US",
            Self::German => "de-DE",
        }
    }

    /// Returns the lowercase name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polish => "polish",
            Self::English => "english",
            Self::German => "german",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polish" | "pl" | "pl-pl" => Ok(Self::Polish),
            "english" | "en" | "en-us" => Ok(Self::English),
            "german" | "de" | "de-de" => Ok(Self::German),
            _ => Err(ParseError::Language(s.to_string())),
        }
    }
}

/// Voice gender as understood by the synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// A female voice.
    Female,
    /// A male voice.
    Male,
}

impl Gender {
    /// Returns the SSML gender tag (`FEMALE` / `MALE`).
    pub fn ssml_tag(self) -> &'static str {
        match self {
            Self::Female => "FEMALE",
            Self::Male => "MALE",
        }
    }

    /// Returns the lowercase name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "female" | "f" => Ok(Self::Female),
            "male" | "m" => Ok(Self::Male),
            _ => Err(ParseError::Gender(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown language or gender string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown language: {0}")]
    Language(String),

    #[error("unknown gender: {0}")]
    Gender(String),
}
