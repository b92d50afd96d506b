//! Timed-caption parsing.
//!
//! Turns an SRT subtitle document into two independent views:
//!
//! 1. [`synced_entries`]: an ordered `(offset_ms, text)` sequence suitable
//!    for a synchronized-lyric (SYLT) track. Malformed blocks are silently
//!    skipped.
//! 2. [`plain_lyrics`]: a plain-text rendering built by a separate
//!    line-by-line pass that only drops index lines and timing lines.
//!
//! The two passes deliberately disagree on malformed input: a block whose
//! timing line is broken contributes nothing to the synced view, but its text
//! lines still surface in the plain view. Both behaviors are contractual.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::CaptionEntry;

/// Canonical SRT timing line, anchored at the start of the line:
/// `H:MM:SS,mmm --> H:MM:SS,mmm`.
static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d+):(\d+),(\d+) --> (\d+):(\d+):(\d+),(\d+)")
        .expect("timing pattern is valid")
});

/// Parse the subtitle document at `path` into synchronized entries.
///
/// Entries are ordered by the source block order (non-decreasing offsets for
/// well-formed documents); duplicate offsets are preserved. A missing or
/// unreadable file yields an empty sequence. Never errors.
#[must_use]
pub fn synced_entries(path: &Path) -> Vec<CaptionEntry> {
    match fs::read_to_string(path) {
        Ok(content) => entries_from_content(&content),
        Err(_) => Vec::new(),
    }
}

/// Render the subtitle document at `path` as plain unsynchronized lyrics.
///
/// A missing or unreadable file yields an empty string. Never errors.
#[must_use]
pub fn plain_lyrics(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => plain_from_content(&content),
        Err(_) => String::new(),
    }
}

pub(crate) fn entries_from_content(content: &str) -> Vec<CaptionEntry> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut entries = Vec::new();

    for block in normalized.trim().split("\n\n") {
        let lines: Vec<&str> = block.trim().split('\n').collect();
        // Index line + timing line at minimum; the timing line is always the
        // second line of a block.
        if lines.len() < 2 {
            continue;
        }

        let Some(caps) = TIMING_LINE.captures(lines[1]) else {
            continue;
        };
        let Some(offset_ms) = start_offset_ms(&caps) else {
            continue;
        };

        let text = lines[2..].join(" ").trim().to_owned();
        if text.is_empty() {
            continue;
        }

        entries.push(CaptionEntry { offset_ms, text });
    }

    entries
}

pub(crate) fn plain_from_content(content: &str) -> String {
    let mut lyrics = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if is_numeric_index(trimmed) || line.contains("-->") {
            continue;
        }
        if !trimmed.is_empty() {
            lyrics.push(trimmed);
        }
    }
    lyrics.join("\n")
}

/// Millisecond offset of the block's start timestamp. Only the start matters;
/// the end timestamp is matched but unused.
fn start_offset_ms(caps: &regex::Captures<'_>) -> Option<u32> {
    let field = |index: usize| caps.get(index)?.as_str().parse::<u32>().ok();
    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = field(4)?;
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes.checked_mul(60_000)?)?
        .checked_add(seconds.checked_mul(1_000)?)?
        .checked_add(millis)
}

// Non-ASCII digits count as indices too.
fn is_numeric_index(line: &str) -> bool {
    !line.is_empty() && line.chars().all(char::is_numeric)
}
