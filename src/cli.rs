//! Command-line interface.
//!
//! Flags cover everything; the source URL and cover path may instead be
//! entered interactively when their flags are omitted, which keeps the
//! quick one-off run to a bare `tunescribe` invocation.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::config::PipelineConfig;
use crate::error::{TsError, TsResult};

#[derive(Debug, Parser)]
#[command(
    name = "tunescribe",
    about = "Download a track, resolve clean song metadata, and write synchronized lyrics into its ID3 tag",
    version
)]
pub struct Cli {
    /// Source URL to process. Prompted for when omitted.
    #[arg(long)]
    pub url: Option<String>,

    /// Path of a JPEG cover image. Prompted for when omitted.
    #[arg(long)]
    pub cover: Option<PathBuf>,

    /// Path of the JSON ledger.
    #[arg(long, default_value = "./data.json")]
    pub ledger: PathBuf,

    /// Directory for transient downloads.
    #[arg(long, default_value = "./downloads")]
    pub download_dir: PathBuf,

    /// Directory for finished, tagged files.
    #[arg(long, default_value = "./finished")]
    pub finished_dir: PathBuf,

    /// Audio bitrate in kbps for the extracted MP3.
    #[arg(long, default_value_t = 320)]
    pub bitrate: u32,

    /// Local text-generation model tag.
    #[arg(long, default_value = "llama3")]
    pub model: String,

    /// Upper bound on one metadata-generation call, in milliseconds.
    /// 0 disables the bound.
    #[arg(long, default_value_t = 120_000)]
    pub generation_timeout_ms: u64,
}

impl Cli {
    #[must_use]
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            ledger_path: self.ledger.clone(),
            download_dir: self.download_dir.clone(),
            finished_dir: self.finished_dir.clone(),
            audio_bitrate_kbps: self.bitrate,
            model_name: self.model.clone(),
            generation_timeout_ms: match self.generation_timeout_ms {
                0 => None,
                ms => Some(ms),
            },
        }
    }

    /// The source URL, prompting on stdin when the flag was omitted.
    /// A URL is mandatory; an empty answer is an error.
    pub fn resolve_url(&self) -> TsResult<String> {
        match &self.url {
            Some(url) if !url.trim().is_empty() => Ok(url.trim().to_owned()),
            _ => require_answer(prompt("Enter the video URL: ")?),
        }
    }

    /// The cover image path, prompting on stdin when the flag was omitted.
    /// The cover is optional: an empty answer maps to a nonexistent path and
    /// the run simply proceeds without artwork.
    pub fn resolve_cover(&self) -> TsResult<PathBuf> {
        match &self.cover {
            Some(path) => Ok(path.clone()),
            None => {
                let answer = prompt("Enter the cover image path (empty to skip): ")?;
                Ok(cover_answer_to_path(&answer))
            }
        }
    }
}

/// Read one trimmed line from stdin; the answer may be empty.
fn prompt(message: &str) -> TsResult<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

fn require_answer(answer: String) -> TsResult<String> {
    if answer.is_empty() {
        return Err(TsError::InvalidRequest(
            "no value entered at the prompt".to_owned(),
        ));
    }
    Ok(answer)
}

fn cover_answer_to_path(answer: &str) -> PathBuf {
    PathBuf::from(answer.trim())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn defaults_mirror_pipeline_config_defaults() {
        let cli = Cli::parse_from(["tunescribe"]);
        let config = cli.to_config();
        let defaults = crate::config::PipelineConfig::default();
        assert_eq!(config.ledger_path, defaults.ledger_path);
        assert_eq!(config.download_dir, defaults.download_dir);
        assert_eq!(config.finished_dir, defaults.finished_dir);
        assert_eq!(config.audio_bitrate_kbps, defaults.audio_bitrate_kbps);
        assert_eq!(config.model_name, defaults.model_name);
        assert_eq!(config.generation_timeout_ms, defaults.generation_timeout_ms);
    }

    #[test]
    fn flags_override_the_config() {
        let cli = Cli::parse_from([
            "tunescribe",
            "--url",
            "https://example.com/v",
            "--cover",
            "/tmp/c.jpg",
            "--model",
            "mistral",
            "--bitrate",
            "192",
            "--ledger",
            "/tmp/ledger.json",
        ]);
        let config = cli.to_config();
        assert_eq!(config.model_name, "mistral");
        assert_eq!(config.audio_bitrate_kbps, 192);
        assert_eq!(config.ledger_path.to_str(), Some("/tmp/ledger.json"));
        assert_eq!(cli.resolve_url().unwrap(), "https://example.com/v");
        assert_eq!(cli.resolve_cover().unwrap().to_str(), Some("/tmp/c.jpg"));
    }

    #[test]
    fn zero_timeout_disables_the_bound() {
        let cli = Cli::parse_from(["tunescribe", "--generation-timeout-ms", "0"]);
        assert_eq!(cli.to_config().generation_timeout_ms, None);
    }

    #[test]
    fn url_flag_with_whitespace_is_trimmed() {
        let cli = Cli::parse_from(["tunescribe", "--url", "  https://example.com/v  "]);
        assert_eq!(cli.resolve_url().unwrap(), "https://example.com/v");
    }

    #[test]
    fn empty_url_answer_is_rejected() {
        assert!(super::require_answer(String::new()).is_err());
        assert_eq!(super::require_answer("u".to_owned()).unwrap(), "u");
    }

    #[test]
    fn empty_cover_answer_maps_to_a_nonexistent_path() {
        let path = super::cover_answer_to_path("");
        assert!(!path.is_file(), "empty answer must skip the cover, not error");
        assert_eq!(super::cover_answer_to_path("  /tmp/c.jpg  ").to_str(), Some("/tmp/c.jpg"));
    }
}
