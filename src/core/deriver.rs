//! Note derivation: turns a song's augmented line sequence into prompt/answer
//! notes, giving each transition the shortest trailing context that still
//! identifies the next line.

use std::collections::{HashMap, HashSet};

use crate::domain::model::{DerivedNote, Disambiguation, Note};
use crate::utils::error::{DeckError, Result};

/// Derives one note per adjacent line transition in `lines`, which must be an
/// augmented sequence (markers included) of at least two elements.
///
/// Each transition gets the shortest trailing window that no other position
/// in the song shares with a different following line. When every size up to
/// the full prefix collides, the full prefix itself becomes the prompt.
/// Identical prompt/answer pairs collapse to their first occurrence, and any
/// prompt left with several answers gets those answers ranked.
pub fn derive_notes(lines: &[String]) -> Result<Vec<DerivedNote>> {
    if lines.len() < 2 {
        return Err(DeckError::InvariantError {
            message: format!(
                "augmented sequence has {} line(s), expected at least 2",
                lines.len()
            ),
        });
    }

    let mut candidates = Vec::with_capacity(lines.len() - 1);
    for i in 1..lines.len() {
        let window = shortest_unique_window(lines, i);
        candidates.push(Note {
            prompt: lines[i - window..i].to_vec(),
            answer: lines[i].clone(),
        });
    }

    Ok(mark_ambiguities(dedup_notes(candidates)))
}

/// Smallest `w` such that the `w` lines ending just before `i` appear nowhere
/// else in the song with a different successor. Falls back to the full prefix
/// (`w == i`) when every size collides, which only happens when a lyric line
/// repeats the start marker text.
fn shortest_unique_window(lines: &[String], i: usize) -> usize {
    for window in 1..=i {
        if is_unique_window(lines, i, window) {
            return window;
        }
    }
    i
}

/// A window is unique when no other end position `j` shows the same lines
/// followed by a different line. A repeat followed by the same line predicts
/// the same answer and does not disqualify.
fn is_unique_window(lines: &[String], i: usize, window: usize) -> bool {
    let target = &lines[i - window..i];
    for j in window..lines.len() {
        if j == i || lines[j] == lines[i] {
            continue;
        }
        if &lines[j - window..j] == target {
            return false;
        }
    }
    true
}

/// Drops exact prompt/answer repeats, keeping first occurrences in order.
fn dedup_notes(candidates: Vec<Note>) -> Vec<Note> {
    let mut seen: HashSet<Note> = HashSet::new();
    let mut notes = Vec::with_capacity(candidates.len());
    for note in candidates {
        if seen.insert(note.clone()) {
            notes.push(note);
        }
    }
    notes
}

/// Ranks the answers of any prompt that maps to more than one answer, in
/// order of first appearance. Notes whose prompt has a single answer carry no
/// mark. Runs on already-deduplicated notes.
pub fn mark_ambiguities(notes: Vec<Note>) -> Vec<DerivedNote> {
    let mut answers_by_prompt: HashMap<Vec<String>, Vec<String>> = HashMap::new();
    for note in &notes {
        let answers = answers_by_prompt.entry(note.prompt.clone()).or_default();
        if !answers.contains(&note.answer) {
            answers.push(note.answer.clone());
        }
    }

    notes
        .into_iter()
        .map(|note| {
            let disambiguation = answers_by_prompt.get(&note.prompt).and_then(|answers| {
                if answers.len() < 2 {
                    return None;
                }
                answers
                    .iter()
                    .position(|answer| *answer == note.answer)
                    .map(|index| Disambiguation {
                        rank: index + 1,
                        of: answers.len(),
                    })
            });
            DerivedNote {
                prompt: note.prompt,
                answer: note.answer,
                disambiguation,
            }
        })
        .collect()
}
