//! Source retrieval.
//!
//! Downloads one remote item as MP3 audio plus an English SRT subtitle
//! document, both placed in the download directory under the item's stable
//! id. The subtitle file is best-effort: plenty of sources carry no captions
//! and the rest of the pipeline treats a missing file as empty lyrics.

use std::fs;
use std::path::PathBuf;

use crate::error::{TsError, TsResult};
use crate::model::FetchedItem;
use crate::process::run_command;

/// The external retrieval collaborator: source URL in, local artifacts out.
pub trait SourceFetcher {
    fn fetch(&self, url: &str) -> TsResult<FetchedItem>;
}

/// Fetches via the `yt-dlp` binary: extracts MP3 audio at a fixed bitrate and
/// requests English subtitles converted to SRT.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    download_dir: PathBuf,
    audio_bitrate_kbps: u32,
}

impl YtDlpFetcher {
    #[must_use]
    pub fn new(download_dir: PathBuf, audio_bitrate_kbps: u32) -> Self {
        Self {
            download_dir,
            audio_bitrate_kbps,
        }
    }

    fn build_args(&self, url: &str) -> Vec<String> {
        let output_template = self
            .download_dir
            .join("%(id)s.%(ext)s")
            .to_string_lossy()
            .into_owned();
        vec![
            "--format".to_owned(),
            "bestaudio".to_owned(),
            "--extract-audio".to_owned(),
            "--audio-format".to_owned(),
            "mp3".to_owned(),
            "--audio-quality".to_owned(),
            format!("{}K", self.audio_bitrate_kbps),
            "--write-subs".to_owned(),
            "--write-auto-subs".to_owned(),
            "--sub-langs".to_owned(),
            "en".to_owned(),
            "--convert-subs".to_owned(),
            "srt".to_owned(),
            "--output".to_owned(),
            output_template,
            "--print-json".to_owned(),
            "--no-progress".to_owned(),
            url.to_owned(),
        ]
    }
}

impl SourceFetcher for YtDlpFetcher {
    fn fetch(&self, url: &str) -> TsResult<FetchedItem> {
        fs::create_dir_all(&self.download_dir)?;

        tracing::info!(%url, "downloading audio and captions");
        let output = run_command("yt-dlp", &self.build_args(url), None)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let item = parse_info_json(&stdout, &self.download_dir)?;

        if !item.audio_path.is_file() {
            return Err(TsError::MissingArtifact(item.audio_path));
        }
        if !item.captions_path.is_file() {
            tracing::warn!(path = %item.captions_path.display(), "no caption file downloaded");
        }
        tracing::info!(id = %item.id, title = %item.title, "download complete");
        Ok(item)
    }
}

/// Pick out `id` and `title` from the JSON info record on stdout and derive
/// the artifact paths from them.
fn parse_info_json(stdout: &str, download_dir: &std::path::Path) -> TsResult<FetchedItem> {
    // The info record is the last non-empty stdout line; warnings and
    // progress noise may precede it.
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| TsError::InvalidRequest("downloader printed no info record".to_owned()))?;

    let info: serde_json::Value = serde_json::from_str(line)?;
    let id = string_field(&info, "id")?;
    let title = string_field(&info, "title")?;

    Ok(FetchedItem {
        audio_path: download_dir.join(format!("{id}.mp3")),
        captions_path: download_dir.join(format!("{id}.en.srt")),
        id,
        title,
    })
}

fn string_field(info: &serde_json::Value, key: &str) -> TsResult<String> {
    info.get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            TsError::InvalidRequest(format!("downloader info record missing `{key}` field"))
        })
}
