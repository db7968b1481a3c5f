use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Movie, PreferenceForm};
use crate::services::matcher::MatchBasis;

/// Where a session is in the browse/recommend cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing loaded yet (or the trending list could not be fetched)
    Idle,
    /// Trending carousel loaded, no preferences submitted
    Browsing,
    /// Preferences submitted but nothing to show for them
    Recommending,
    /// A recommendation is on screen
    Viewing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    You,
    Chatbot,
}

/// One line of the chatbot panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// The movie picked for the user and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub movie: Movie,
    pub basis: MatchBasis,
}

/// Per-session state of the presentation shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub phase: Phase,
    pub trending: Vec<Movie>,
    pub trending_index: usize,
    /// Last submitted preferences
    pub preferences: Option<PreferenceForm>,
    /// Candidate pool fetched for `preferences`
    pub candidates: Vec<Movie>,
    pub recommendation: Option<Recommendation>,
    pub chat_history: Vec<ChatTurn>,
    /// Message shown once, cleared by the next event
    pub notice: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Creates an idle session with a fresh id
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Idle,
            trending: Vec::new(),
            trending_index: 0,
            preferences: None,
            candidates: Vec::new(),
            recommendation: None,
            chat_history: Vec::new(),
            notice: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the carousel by `delta`, wrapping around the trending list
    pub fn step_trending(&mut self, delta: isize) {
        let len = self.trending.len();
        if len == 0 {
            return;
        }
        let shifted = (self.trending_index as isize + delta).rem_euclid(len as isize);
        self.trending_index = shifted as usize;
    }

    /// Up to `size` trending movies starting at the carousel index, wrapping
    pub fn trending_window(&self, size: usize) -> Vec<&Movie> {
        let len = self.trending.len();
        (0..size.min(len))
            .map(|offset| &self.trending[(self.trending_index + offset) % len])
            .collect()
    }

    /// Appends a chat turn, keeping only the newest `limit` turns
    pub fn push_chat(&mut self, turn: ChatTurn, limit: usize) {
        self.chat_history.push(turn);
        if self.chat_history.len() > limit {
            let excess = self.chat_history.len() - limit;
            self.chat_history.drain(..excess);
        }
    }

    /// Forgets the submitted preferences and whatever came of them
    pub fn clear_search(&mut self) {
        self.preferences = None;
        self.candidates.clear();
        self.recommendation = None;
    }
}
