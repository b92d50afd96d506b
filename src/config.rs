//! Pipeline configuration.
//!
//! Every path, bitrate, and model name the pipeline depends on lives here as
//! an explicit value passed in at construction time, never as process-global
//! state. `Default` documents the out-of-the-box layout.

use std::path::PathBuf;

/// Configuration for one [`crate::Pipeline`] instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the JSON ledger recording completed runs.
    pub ledger_path: PathBuf,
    /// Directory for transient per-item downloads (audio + captions).
    pub download_dir: PathBuf,
    /// Directory where finished, fully tagged audio files are placed.
    pub finished_dir: PathBuf,
    /// Target audio bitrate in kbps for the extracted MP3.
    pub audio_bitrate_kbps: u32,
    /// Name of the local text-generation model (Ollama model tag).
    pub model_name: String,
    /// Upper bound on one text-generation call, in milliseconds.
    ///
    /// `None` disables the bound and lets the call block indefinitely.
    pub generation_timeout_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("./data.json"),
            download_dir: PathBuf::from("./downloads"),
            finished_dir: PathBuf::from("./finished"),
            audio_bitrate_kbps: 320,
            model_name: "llama3".to_owned(),
            generation_timeout_ms: Some(120_000),
        }
    }
}
