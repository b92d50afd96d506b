//! Metadata resolution via a local text-generation model.
//!
//! Given a free-text video title, the resolver asks the model for a clean
//! `{song, artists}` record and defensively extracts JSON from whatever text
//! comes back. Model output carries no structural guarantee (it routinely
//! wraps the object in explanatory prose), so extraction runs in three
//! tiers, and every failure path lands on the fallback record instead of an
//! error. Resolution never fails.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::TsResult;
use crate::model::{Provenance, Resolution, SongMetadata};
use crate::process::run_command_with_input;

/// Greedy DOTALL scan for the first `{` to the last `}`. Model prose around
/// the object is common; prose inside braces still fails the JSON parse and
/// falls through to the fallback tier.
static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object pattern is valid"));

/// The external text-generation collaborator: prompt in, raw text out.
///
/// Implementations are synchronous and may fail (missing binary, timeout);
/// the resolver converts any failure into the fallback record.
pub trait MetadataGenerator {
    fn generate(&self, prompt: &str) -> TsResult<String>;
}

/// Runs `ollama run <model>` with the prompt piped on stdin.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    model: String,
    timeout: Option<Duration>,
}

impl OllamaGenerator {
    #[must_use]
    pub fn new(model: String, timeout_ms: Option<u64>) -> Self {
        Self {
            model,
            timeout: timeout_ms.map(Duration::from_millis),
        }
    }
}

impl MetadataGenerator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> TsResult<String> {
        let args = vec!["run".to_owned(), self.model.clone()];
        let output = run_command_with_input("ollama", &args, prompt.as_bytes(), self.timeout)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

/// Resolve song metadata for `title`. Never fails: generator errors and
/// unparseable output both produce the fallback record, with the path taken
/// recorded in [`Resolution::provenance`].
pub fn resolve(title: &str, generator: &dyn MetadataGenerator) -> Resolution {
    let prompt = build_prompt(title);
    tracing::info!(%title, "querying text-generation model for clean metadata");

    let raw = match generator.generate(&prompt) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(%error, "metadata generation failed; using fallback record");
            return Resolution {
                metadata: SongMetadata::fallback(title),
                provenance: Provenance::Fallback,
            };
        }
    };

    match extract_metadata(&raw) {
        Some(metadata) => {
            tracing::info!(song = %metadata.song, artists = ?metadata.artists, "model metadata accepted");
            Resolution {
                metadata,
                provenance: Provenance::Validated,
            }
        }
        None => {
            tracing::warn!("model output had no usable record; using fallback record");
            Resolution {
                metadata: SongMetadata::fallback(title),
                provenance: Provenance::Fallback,
            }
        }
    }
}

pub(crate) fn build_prompt(title: &str) -> String {
    format!(
        "The video title is: \"{title}\".\n\
         Give me a clean Spotify-style format:\n\
         - Song Name\n\
         - Artist(s)\n\
         Return it in JSON: {{\"song\": \"...\", \"artists\": [\"...\"]}}\n"
    )
}

/// Tiers 1 and 2: direct parse, then embedded-object parse. Returns `None`
/// when neither yields a record that survives validation.
fn extract_metadata(raw: &str) -> Option<SongMetadata> {
    if let Some(metadata) = parse_and_validate(raw) {
        return Some(metadata);
    }
    EMBEDDED_OBJECT
        .find(raw)
        .and_then(|m| parse_and_validate(m.as_str()))
}

fn parse_and_validate(candidate: &str) -> Option<SongMetadata> {
    let parsed: SongMetadata = serde_json::from_str(candidate).ok()?;
    validate(parsed)
}

/// A usable record has a non-empty song title and at least one non-empty
/// artist. Empty artist strings are dropped rather than stored.
fn validate(mut metadata: SongMetadata) -> Option<SongMetadata> {
    if metadata.song.trim().is_empty() {
        return None;
    }
    metadata.artists.retain(|artist| !artist.trim().is_empty());
    if metadata.artists.is_empty() {
        return None;
    }
    Some(metadata)
}

#[cfg(test)]
mod tests {
    use crate::error::{TsError, TsResult};
    use crate::model::Provenance;

    use super::{build_prompt, extract_metadata, resolve, MetadataGenerator};

    struct CannedGenerator(&'static str);

    impl MetadataGenerator for CannedGenerator {
        fn generate(&self, _prompt: &str) -> TsResult<String> {
            Ok(self.0.to_owned())
        }
    }

    struct FailingGenerator;

    impl MetadataGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> TsResult<String> {
            Err(TsError::CommandMissing {
                command: "ollama".to_owned(),
            })
        }
    }

    #[test]
    fn clean_json_is_validated() {
        let resolution = resolve(
            "whatever",
            &CannedGenerator(r#"{"song": "Test", "artists": ["A", "B"]}"#),
        );
        assert_eq!(resolution.provenance, Provenance::Validated);
        assert_eq!(resolution.metadata.song, "Test");
        assert_eq!(resolution.metadata.artists, vec!["A", "B"]);
    }

    #[test]
    fn json_embedded_in_prose_is_extracted() {
        let resolution = resolve(
            "whatever",
            &CannedGenerator(r#"I think this is: {"song": "Test", "artists": ["A", "B"]}"#),
        );
        assert_eq!(resolution.provenance, Provenance::Validated);
        assert_eq!(resolution.metadata.song, "Test");
        assert_eq!(resolution.metadata.artists, vec!["A", "B"]);
    }

    #[test]
    fn json_spanning_lines_is_extracted() {
        let raw = "Sure! Here you go:\n{\n  \"song\": \"Multi\",\n  \"artists\": [\"X\"]\n}\nHope that helps.";
        let resolution = resolve("whatever", &CannedGenerator(Box::leak(raw.to_owned().into_boxed_str())));
        assert_eq!(resolution.provenance, Provenance::Validated);
        assert_eq!(resolution.metadata.song, "Multi");
    }

    #[test]
    fn prose_without_json_falls_back() {
        let resolution = resolve("Some Title", &CannedGenerator("not json at all"));
        assert_eq!(resolution.provenance, Provenance::Fallback);
        assert_eq!(resolution.metadata.song, "Some Title");
        assert_eq!(resolution.metadata.artists, vec!["Unknown"]);
    }

    #[test]
    fn empty_output_falls_back() {
        let resolution = resolve("Some Title", &CannedGenerator(""));
        assert_eq!(resolution.provenance, Provenance::Fallback);
        assert_eq!(resolution.metadata.song, "Some Title");
    }

    #[test]
    fn generator_failure_falls_back_instead_of_erroring() {
        let resolution = resolve("Some Title", &FailingGenerator);
        assert_eq!(resolution.provenance, Provenance::Fallback);
        assert_eq!(resolution.metadata.song, "Some Title");
        assert_eq!(resolution.metadata.artists, vec!["Unknown"]);
    }

    #[test]
    fn record_with_empty_song_is_rejected() {
        let resolution = resolve(
            "Original",
            &CannedGenerator(r#"{"song": "  ", "artists": ["A"]}"#),
        );
        assert_eq!(resolution.provenance, Provenance::Fallback);
        assert_eq!(resolution.metadata.song, "Original");
    }

    #[test]
    fn record_with_no_usable_artists_is_rejected() {
        let resolution = resolve(
            "Original",
            &CannedGenerator(r#"{"song": "Test", "artists": ["", "  "]}"#),
        );
        assert_eq!(resolution.provenance, Provenance::Fallback);
    }

    #[test]
    fn empty_artist_strings_are_dropped_from_valid_records() {
        let resolution = resolve(
            "Original",
            &CannedGenerator(r#"{"song": "Test", "artists": ["", "Real"]}"#),
        );
        assert_eq!(resolution.provenance, Provenance::Validated);
        assert_eq!(resolution.metadata.artists, vec!["Real"]);
    }

    #[test]
    fn broken_json_inside_braces_falls_back() {
        let resolution = resolve(
            "Original",
            &CannedGenerator("result: {song: Test, artists: nope}"),
        );
        assert_eq!(resolution.provenance, Provenance::Fallback);
    }

    #[test]
    fn resolution_always_has_nonempty_song_and_artists() {
        let outputs = [
            "",
            "not json at all",
            "{}",
            r#"{"song": "", "artists": []}"#,
            r#"{"artists": ["A"]}"#,
            r#"mid-sentence {"song": "S", "artists": ["A"]} trailing"#,
        ];
        for output in outputs {
            let resolution = resolve(
                "T",
                &CannedGenerator(Box::leak(output.to_owned().into_boxed_str())),
            );
            assert!(!resolution.metadata.song.is_empty(), "for output {output:?}");
            assert!(
                !resolution.metadata.artists.is_empty(),
                "for output {output:?}"
            );
        }
    }

    #[test]
    fn extract_metadata_uses_greedy_brace_span() {
        // Greedy scan covers first `{` to last `}`; a parseable object with
        // trailing garbage braces is therefore rejected, not salvaged.
        let raw = r#"{"song": "S", "artists": ["A"]} {extra}"#;
        assert!(extract_metadata(raw).is_none());
    }

    #[test]
    fn prompt_mentions_title_and_requested_shape() {
        let prompt = build_prompt("My Video");
        assert!(prompt.contains("\"My Video\""));
        assert!(prompt.contains("\"song\""));
        assert!(prompt.contains("\"artists\""));
    }
}
