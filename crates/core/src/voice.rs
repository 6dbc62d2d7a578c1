//! Voice command matching
//!
//! Recognized phrases are matched against an ordered keyword table.
//! Matching is a case-insensitive substring test and the first rule wins,
//! so "Save this measurement" starts a scan ("measure" comes first).

use crate::mode::Mode;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a recognized phrase asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceAction {
    StartScan,
    Save,
    OpenExport,
    SetMode(Mode),
}

/// One row of the keyword table
#[derive(Debug, Clone, Copy)]
pub struct VoiceRule {
    pub keywords: &'static [&'static str],
    pub action: VoiceAction,
}

/// Keyword table in priority order
pub const VOICE_RULES: [VoiceRule; 8] = [
    VoiceRule {
        keywords: &["scan", "measure", "auto"],
        action: VoiceAction::StartScan,
    },
    VoiceRule {
        keywords: &["save", "cloud"],
        action: VoiceAction::Save,
    },
    VoiceRule {
        keywords: &["export", "share"],
        action: VoiceAction::OpenExport,
    },
    VoiceRule {
        keywords: &["level"],
        action: VoiceAction::SetMode(Mode::Level),
    },
    VoiceRule {
        keywords: &["distance"],
        action: VoiceAction::SetMode(Mode::Distance),
    },
    VoiceRule {
        keywords: &["area"],
        action: VoiceAction::SetMode(Mode::Area),
    },
    VoiceRule {
        keywords: &["volume"],
        action: VoiceAction::SetMode(Mode::Volume),
    },
    VoiceRule {
        keywords: &["furniture", "fit"],
        action: VoiceAction::SetMode(Mode::Furniture),
    },
];

/// Phrases the simulated recognizer can "hear"
pub const SIMULATED_PHRASES: [&str; 4] = [
    "Scan the room",
    "Save this measurement",
    "Switch to Level mode",
    "Check furniture fit",
];

/// Match a phrase against [`VOICE_RULES`]
pub fn match_phrase(phrase: &str) -> Option<VoiceAction> {
    let phrase = phrase.to_lowercase();
    VOICE_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| phrase.contains(keyword)))
        .map(|rule| rule.action)
}

/// Pick a phrase for the simulated recognizer
pub fn simulated_phrase<R: Rng>(rng: &mut R) -> &'static str {
    SIMULATED_PHRASES.choose(rng).copied().unwrap_or(SIMULATED_PHRASES[0])
}

/// Listening state of the simulated recognizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceListener {
    listening: bool,
    last_command: Option<String>,
}

impl VoiceListener {
    /// Flip listening on or off, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.listening = !self.listening;
        self.listening
    }

    /// Remember a recognized phrase
    pub fn heard(&mut self, phrase: &str) {
        self.last_command = Some(phrase.to_string());
    }

    pub fn stop(&mut self) {
        self.listening = false;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// The most recently recognized phrase
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }
}
