//! Core domain types shared across the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One synchronized-lyric line: text to be inserted at a playback offset.
///
/// Entries carry no duration. A synchronized-lyric track has "insert text at
/// this point" semantics, not spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Offset from the start of the audio, in milliseconds.
    pub offset_ms: u32,
    /// Caption text. Always non-empty.
    pub text: String,
}

/// Structured song metadata derived from a free-text video title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub song: String,
    pub artists: Vec<String>,
}

impl SongMetadata {
    /// The default record substituted when structured extraction fails.
    #[must_use]
    pub fn fallback(title: &str) -> Self {
        Self {
            song: title.to_owned(),
            artists: vec!["Unknown".to_owned()],
        }
    }
}

/// Which path produced a [`SongMetadata`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A structured record was extracted from model output and validated.
    Validated,
    /// The fallback record `{song: <title>, artists: ["Unknown"]}`.
    Fallback,
}

/// Outcome of metadata resolution. Resolution never fails; `provenance`
/// records whether the model output survived validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub metadata: SongMetadata,
    pub provenance: Provenance,
}

/// Everything the tag composer writes into one audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBundle {
    pub title: String,
    pub artists: Vec<String>,
    /// Synchronized lyric entries; empty sequence skips the SYLT frame.
    pub synced: Vec<CaptionEntry>,
    /// Plain unsynchronized lyrics; empty string skips the USLT frame.
    pub plain_lyrics: String,
    /// Raw cover image bytes; `None` skips the APIC frame.
    pub cover: Option<Vec<u8>>,
}

/// What the retrieval collaborator hands back for one source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedItem {
    /// Stable identifier of the remote item.
    pub id: String,
    /// Human-readable title as published by the source.
    pub title: String,
    /// Local path of the already-transcoded audio file.
    pub audio_path: PathBuf,
    /// Local path where the English subtitle document would be.
    ///
    /// The file may legitimately not exist (no captions available).
    pub captions_path: PathBuf,
}

/// Ledger entry status for a fully completed run.
pub const STATUS_DONE: &str = "done";

/// Durable record of one completed pipeline run.
///
/// Entries are appended once and never mutated or deleted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub source_url: String,
    pub cover_path: String,
    pub final_audio_path: String,
    pub captions_path: String,
    pub status: String,
    pub song_name: String,
    pub artists: Vec<String>,
}
