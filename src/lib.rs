#![forbid(unsafe_code)]

pub mod captions;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod process;
pub mod resolver;
pub mod tagger;

pub use config::PipelineConfig;
pub use error::{TsError, TsResult};
pub use model::{CaptionEntry, LedgerEntry, Provenance, Resolution, SongMetadata, TagBundle};
pub use pipeline::Pipeline;
