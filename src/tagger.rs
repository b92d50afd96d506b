//! ID3 tag composition.
//!
//! Assembles one [`TagBundle`] from pipeline artifacts and writes it into an
//! MP3 as an ID3v2.4 tag: TIT2 (title), TPE1 (artists), USLT (plain lyrics),
//! SYLT (synchronized lyrics), APIC (front-cover image). The optional frames
//! are skipped when their input is empty, never written with empty content.

use std::fs;
use std::path::Path;

use id3::frame::{
    Content, Lyrics, Picture, PictureType, SynchronisedLyrics, SynchronisedLyricsType,
    TimestampFormat,
};
use id3::{Frame, Tag, TagLike, Version};

use crate::error::TsResult;
use crate::model::{CaptionEntry, TagBundle};

const LYRICS_LANGUAGE: &str = "eng";
const LYRICS_DESCRIPTION: &str = "Lyrics";
const COVER_MIME: &str = "image/jpeg";
const COVER_DESCRIPTION: &str = "Cover";

impl TagBundle {
    /// Gather the tag inputs into one value.
    ///
    /// The cover is read eagerly so a vanished image file fails here rather
    /// than mid-write; a cover path that does not exist yields `None` and the
    /// APIC frame is simply skipped.
    pub fn assemble(
        title: String,
        artists: Vec<String>,
        synced: Vec<CaptionEntry>,
        plain_lyrics: String,
        cover_path: &Path,
    ) -> TsResult<Self> {
        let cover = if cover_path.is_file() {
            Some(fs::read(cover_path)?)
        } else {
            tracing::warn!(path = %cover_path.display(), "cover image not found; skipping APIC frame");
            None
        };
        Ok(Self {
            title,
            artists,
            synced,
            plain_lyrics,
            cover,
        })
    }
}

/// Write `bundle` into the audio file at `path` as ID3v2.4.
///
/// An existing tag is loaded and updated in place so frames this crate does
/// not manage survive; a file with no tag starts from an empty one.
pub fn write_tags(path: &Path, bundle: &TagBundle) -> TsResult<()> {
    let mut tag = read_or_empty(path)?;

    tag.set_title(&bundle.title);
    tag.add_frame(Frame::with_content(
        "TPE1",
        Content::new_text_values(bundle.artists.iter().cloned()),
    ));

    if !bundle.plain_lyrics.is_empty() {
        tag.add_frame(Lyrics {
            lang: LYRICS_LANGUAGE.to_owned(),
            description: LYRICS_DESCRIPTION.to_owned(),
            text: bundle.plain_lyrics.clone(),
        });
    }

    if !bundle.synced.is_empty() {
        tag.add_frame(SynchronisedLyrics {
            lang: LYRICS_LANGUAGE.to_owned(),
            timestamp_format: TimestampFormat::Ms,
            content_type: SynchronisedLyricsType::Lyrics,
            description: LYRICS_DESCRIPTION.to_owned(),
            content: bundle
                .synced
                .iter()
                .map(|entry| (entry.offset_ms, entry.text.clone()))
                .collect(),
        });
    }

    if let Some(cover) = &bundle.cover {
        tag.add_frame(Picture {
            mime_type: COVER_MIME.to_owned(),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.to_owned(),
            data: cover.clone(),
        });
    }

    tag.write_to_path(path, Version::Id3v24)?;
    tracing::info!(
        path = %path.display(),
        synced_lines = bundle.synced.len(),
        has_cover = bundle.cover.is_some(),
        "wrote ID3 tag"
    );
    Ok(())
}

fn read_or_empty(path: &Path) -> TsResult<Tag> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(error) if matches!(error.kind, id3::ErrorKind::NoTag) => Ok(Tag::new()),
        Err(error) => Err(error.into()),
    }
}
