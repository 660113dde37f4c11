//! Polly voice selection.
//!
//! The pipeline exposes the fixed set of English voices the workflows
//! are allowed to pick from, not the full Polly catalogue.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Voice {
    Joanna,
    Matthew,
    Amy,
    Brian,
    Emma,
    Olivia,
}

impl Voice {
    /// Polly `VoiceId` string for API requests and result records.
    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Joanna => "Joanna",
            Voice::Matthew => "Matthew",
            Voice::Amy => "Amy",
            Voice::Brian => "Brian",
            Voice::Emma => "Emma",
            Voice::Olivia => "Olivia",
        }
    }

    /// Parse a voice name case-insensitively (config and env values).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "joanna" => Some(Voice::Joanna),
            "matthew" => Some(Voice::Matthew),
            "amy" => Some(Voice::Amy),
            "brian" => Some(Voice::Brian),
            "emma" => Some(Voice::Emma),
            "olivia" => Some(Voice::Olivia),
            _ => None,
        }
    }
}

impl Default for Voice {
    fn default() -> Self {
        Voice::Joanna
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
