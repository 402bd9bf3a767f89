use serde::Serialize;

use crate::utils::error::{DeckError, Result};

/// Synthetic first line of every song. Gives the opening lyric line a prompt
/// and anchors window search for early positions.
pub const START_MARKER: &str = "--START--";

/// Synthetic last line of every song, so the final lyric line is prompted too.
pub const END_MARKER: &str = "--END--";

/// One lyric file, reduced to its non-empty trimmed lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub title: String,
    pub lines: Vec<String>,
}

impl Song {
    /// Builds a song from raw file content. Lines are trimmed and blank lines
    /// dropped; a file with nothing left is rejected as empty.
    pub fn from_content(title: impl Into<String>, content: &str) -> Result<Self> {
        let title = title.into();
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if lines.is_empty() {
            return Err(DeckError::EmptySongError { song: title });
        }

        Ok(Self { title, lines })
    }

    /// The lyric lines bracketed by the start and end markers, which is the
    /// sequence note derivation runs on.
    pub fn augmented_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        lines.push(START_MARKER.to_string());
        lines.extend(self.lines.iter().cloned());
        lines.push(END_MARKER.to_string());
        lines
    }
}

/// A cue/recall pair in line form: the prompt is one or more consecutive
/// lines, the answer is the single line that follows them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Note {
    pub prompt: Vec<String>,
    pub answer: String,
}

/// Position of one answer among several answers sharing the same prompt.
/// Ranks are 1-based and follow derivation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Disambiguation {
    pub rank: usize,
    pub of: usize,
}

/// A note after deduplication and ambiguity marking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedNote {
    pub prompt: Vec<String>,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<Disambiguation>,
}

/// A note rendered to the two CSV fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    pub front: String,
    pub back: String,
}

/// Sidecar record for a card whose prompt maps to more than one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguousCard {
    pub song: String,
    pub prompt: Vec<String>,
    pub answer: String,
    pub rank: usize,
    pub of: usize,
}

/// Contents of the ambiguity report written next to the deck.
#[derive(Debug, Clone, Serialize)]
pub struct AmbiguityReport {
    pub generated_at: String,
    pub cards: Vec<AmbiguousCard>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub cards: Vec<RenderedCard>,
    pub ambiguous: Vec<AmbiguousCard>,
    pub songs_processed: usize,
}
