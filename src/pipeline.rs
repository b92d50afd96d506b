//! End-to-end orchestration.
//!
//! One [`Pipeline::process`] call takes a source URL and a cover image path
//! through the full sequence: download, caption parsing, metadata
//! resolution, tag writing, the move into the finished directory, and the
//! ledger append. Every completed run appends exactly one ledger entry, even
//! when the same URL is processed again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::captions;
use crate::config::PipelineConfig;
use crate::error::TsResult;
use crate::fetch::{SourceFetcher, YtDlpFetcher};
use crate::ledger;
use crate::model::{LedgerEntry, TagBundle, STATUS_DONE};
use crate::resolver::{self, MetadataGenerator, OllamaGenerator};
use crate::tagger;

pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Box<dyn SourceFetcher>,
    generator: Box<dyn MetadataGenerator>,
}

impl Pipeline {
    /// Build a pipeline with the production collaborators (`yt-dlp` for
    /// retrieval, `ollama` for metadata generation).
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let fetcher = YtDlpFetcher::new(config.download_dir.clone(), config.audio_bitrate_kbps);
        let generator =
            OllamaGenerator::new(config.model_name.clone(), config.generation_timeout_ms);
        Self {
            config,
            fetcher: Box::new(fetcher),
            generator: Box::new(generator),
        }
    }

    /// Build a pipeline around externally supplied collaborators.
    #[must_use]
    pub fn with_collaborators(
        config: PipelineConfig,
        fetcher: Box<dyn SourceFetcher>,
        generator: Box<dyn MetadataGenerator>,
    ) -> Self {
        Self {
            config,
            fetcher,
            generator,
        }
    }

    /// Process one source URL into a tagged file in the finished directory
    /// and return the ledger entry that was appended.
    pub fn process(&self, source_url: &str, cover_path: &Path) -> TsResult<LedgerEntry> {
        // Load up front so a corrupt ledger aborts before any download work.
        let mut entries = ledger::load(&self.config.ledger_path)?;

        let item = self.fetcher.fetch(source_url)?;

        let synced = captions::synced_entries(&item.captions_path);
        let plain = captions::plain_lyrics(&item.captions_path);
        tracing::info!(
            synced_lines = synced.len(),
            has_plain = !plain.is_empty(),
            "captions parsed"
        );

        let resolution = resolver::resolve(&item.title, self.generator.as_ref());
        let metadata = resolution.metadata;
        tracing::info!(
            song = %metadata.song,
            provenance = ?resolution.provenance,
            "metadata resolved"
        );

        let bundle = TagBundle::assemble(
            metadata.song.clone(),
            metadata.artists.clone(),
            synced,
            plain,
            cover_path,
        )?;
        tagger::write_tags(&item.audio_path, &bundle)?;

        let final_path = self.finished_path(&metadata.song, &item.audio_path);
        move_file(&item.audio_path, &final_path)?;
        tracing::info!(path = %final_path.display(), "finished file placed");

        let entry = LedgerEntry {
            id: item.id,
            source_url: source_url.to_owned(),
            cover_path: cover_path.to_string_lossy().into_owned(),
            final_audio_path: final_path.to_string_lossy().into_owned(),
            captions_path: item.captions_path.to_string_lossy().into_owned(),
            status: STATUS_DONE.to_owned(),
            song_name: metadata.song,
            artists: metadata.artists,
        };
        entries.push(entry.clone());
        ledger::save(&self.config.ledger_path, &entries)?;

        Ok(entry)
    }

    /// `<finished_dir>/<song>.<ext>`, keeping the downloaded file's extension.
    fn finished_path(&self, song: &str, audio_path: &Path) -> PathBuf {
        let ext = audio_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("mp3");
        self.config.finished_dir.join(format!("{song}.{ext}"))
    }
}

/// Move `from` to `to`, creating the destination directory. Falls back to
/// copy-then-remove when rename fails (different filesystems).
fn move_file(from: &Path, to: &Path) -> TsResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)?;
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}
