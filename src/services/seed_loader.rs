//! Prompt seed file loading.
//!
//! Seeds are markdown files with YAML front matter:
//!
//! ```text
//! ---
//! name: weekly-ideas
//! type: ideas
//! ---
//! Generate {ideas} post ideas about {name}.
//! ```
//!
//! The front matter delimiter is a line consisting solely of `---`. Anything
//! after the second delimiter is the template body, including further
//! delimiter lines. Files ending in `.old.md` are retired templates kept for
//! history and are never loaded.
//!
//! Loading never fails because of a single bad file: malformed seeds are
//! skipped with a warning. Only an unreadable directory is an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::instrument;
use walkdir::WalkDir;

use crate::models::{PlaceholderDefinition, PromptType, SeedPromptFile, scan_placeholders};
use crate::{Error, Result};

/// Front matter delimiter line.
const DELIMITER: &str = "---";

/// Seed file suffix.
pub const SEED_SUFFIX: &str = ".md";

/// Suffix of retired seed files, which are never loaded.
pub const LEGACY_SUFFIX: &str = ".old.md";

/// Why a seed file was skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeedRejection {
    /// The file could not be read.
    #[error("failed to read seed file: {0}")]
    Unreadable(String),
    /// Fewer than two delimiter lines.
    #[error("missing or malformed front matter")]
    MissingFrontMatter,
    /// Non-blank text before the first delimiter.
    #[error("unexpected content before front matter")]
    ContentBeforeFrontMatter,
    /// The metadata block is not valid YAML of the expected shape.
    #[error("invalid front matter: {0}")]
    InvalidMetadata(String),
    /// `name` is absent or blank.
    #[error("front matter is missing 'name'")]
    MissingName,
    /// `type` is absent or blank.
    #[error("front matter is missing 'type'")]
    MissingType,
    /// `type` is not a known category.
    #[error("unknown prompt type '{0}'")]
    UnknownType(String),
    /// The body is blank.
    #[error("template body is empty")]
    EmptyBody,
}

/// Metadata keys read from the front matter. Other keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct SeedMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    prompt_type: Option<String>,
}

/// Outcome of loading a seed directory.
#[derive(Debug, Default)]
pub struct SeedLoadReport {
    /// Parsed seeds in directory-walk order.
    pub seeds: Vec<SeedPromptFile>,
    /// Candidate files that were skipped, with the reason.
    pub rejected: Vec<(PathBuf, SeedRejection)>,
}

/// Loader for prompt seed directories.
pub struct SeedLoader;

impl SeedLoader {
    /// Loads every valid seed under `dir`, recursively.
    ///
    /// Entries are visited sorted by file name within each directory, so the
    /// result order is stable across runs and platforms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if `dir` is not a readable directory.
    pub fn load_from_directory(dir: impl AsRef<Path>) -> Result<Vec<SeedPromptFile>> {
        Self::load_with_report(dir.as_ref()).map(|report| report.seeds)
    }

    /// Loads a seed directory, also reporting the rejected files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if `dir` is not a readable directory.
    #[instrument(skip_all, fields(path = %dir.display()))]
    pub fn load_with_report(dir: &Path) -> Result<SeedLoadReport> {
        std::fs::read_dir(dir).map_err(|e| Error::OperationFailed {
            operation: "read_seed_directory".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })?;

        let mut report = SeedLoadReport::default();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(Error::operation("read_seed_directory", e));
                },
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable seed entry");
                    continue;
                },
            };

            if !entry.file_type().is_file() || !Self::is_seed_file(entry.path()) {
                continue;
            }

            match Self::load_file(entry.path()) {
                Ok(seed) => {
                    tracing::debug!(
                        path = %entry.path().display(),
                        name = %seed.name,
                        prompt_type = %seed.prompt_type,
                        "loaded seed prompt"
                    );
                    report.seeds.push(seed);
                },
                Err(reason) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        reason = %reason,
                        "skipping invalid seed file"
                    );
                    metrics::counter!("seed_files_rejected_total").increment(1);
                    report.rejected.push((entry.path().to_path_buf(), reason));
                },
            }
        }

        tracing::info!(
            loaded = report.seeds.len(),
            rejected = report.rejected.len(),
            "seed directory loaded"
        );
        Ok(report)
    }

    /// Returns `true` if `path` names a loadable seed file (`*.md`, not `*.old.md`).
    #[must_use]
    pub fn is_seed_file(path: &Path) -> bool {
        path.file_name()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|name| name.ends_with(SEED_SUFFIX) && !name.ends_with(LEGACY_SUFFIX))
    }

    /// Reads and parses one seed file.
    ///
    /// # Errors
    ///
    /// Returns the reason the file is not a valid seed.
    pub fn load_file(path: &Path) -> std::result::Result<SeedPromptFile, SeedRejection> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SeedRejection::Unreadable(e.to_string()))?;
        let seed = Self::parse(&content)?;
        check_placeholders(path, &seed);
        Ok(seed)
    }

    /// Parses seed file content.
    ///
    /// # Errors
    ///
    /// Returns the reason the content is not a valid seed.
    pub fn parse(content: &str) -> std::result::Result<SeedPromptFile, SeedRejection> {
        let (preamble, metadata, body) =
            split_front_matter(content).ok_or(SeedRejection::MissingFrontMatter)?;

        if !preamble.trim_start_matches('\u{feff}').trim().is_empty() {
            return Err(SeedRejection::ContentBeforeFrontMatter);
        }

        let metadata: SeedMetadata = if metadata.trim().is_empty() {
            SeedMetadata::default()
        } else {
            serde_yaml_ng::from_str(metadata)
                .map_err(|e| SeedRejection::InvalidMetadata(e.to_string()))?
        };

        let name = metadata
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(SeedRejection::MissingName)?;

        let raw_type = metadata
            .prompt_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SeedRejection::MissingType)?;
        let prompt_type = PromptType::parse(raw_type)
            .ok_or_else(|| SeedRejection::UnknownType(raw_type.to_string()))?;

        let body = body.trim();
        if body.is_empty() {
            return Err(SeedRejection::EmptyBody);
        }

        Ok(SeedPromptFile::new(name, prompt_type, body))
    }
}

/// Splits content into preamble, metadata block and body.
///
/// Returns `None` when fewer than two delimiter lines exist. The body is
/// everything after the second delimiter line, verbatim.
fn split_front_matter(content: &str) -> Option<(&str, &str, &str)> {
    let mut delimiters = Vec::with_capacity(2);
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            delimiters.push((offset, offset + line.len()));
            if delimiters.len() == 2 {
                break;
            }
        }
        offset += line.len();
    }

    match delimiters.as_slice() {
        [(first_start, first_end), (second_start, second_end)] => Some((
            &content[..*first_start],
            &content[*first_end..*second_start],
            &content[*second_end..],
        )),
        _ => None,
    }
}

/// Logs required tokens missing from a seed and tokens the engine won't fill.
fn check_placeholders(path: &Path, seed: &SeedPromptFile) {
    for definition in PlaceholderDefinition::for_type(seed.prompt_type).filter(|d| d.required) {
        if !seed.content.contains(definition.token) {
            tracing::warn!(
                path = %path.display(),
                name = %seed.name,
                token = definition.token,
                "seed prompt does not use its required placeholder"
            );
        }
    }

    for span in scan_placeholders(&seed.content) {
        let token = span.as_str(&seed.content);
        let applies = PlaceholderDefinition::find(token)
            .is_some_and(|definition| definition.applies_to(seed.prompt_type));
        if !applies {
            tracing::debug!(
                path = %path.display(),
                name = %seed.name,
                token,
                "placeholder will be left unresolved"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VALID_IDEAS: &str = "---\nname: weekly\ntype: ideas\n---\nGenerate {ideas} ideas about {name}\n";

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_valid_seed() {
        let seed = SeedLoader::parse(VALID_IDEAS).unwrap();
        assert_eq!(seed.name, "weekly");
        assert_eq!(seed.prompt_type, PromptType::Ideas);
        assert_eq!(seed.content, "Generate {ideas} ideas about {name}");
    }

    #[test]
    fn test_parse_trims_name_and_body() {
        let content = "---\nname: '  post  '\ntype: drafts\n---\n\n   Write {content}  \n\n";
        let seed = SeedLoader::parse(content).unwrap();
        assert_eq!(seed.name, "post");
        assert_eq!(seed.content, "Write {content}");
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let content = "---\r\nname: post\r\ntype: drafts\r\n---\r\nWrite {content}\r\n";
        let seed = SeedLoader::parse(content).unwrap();
        assert_eq!(seed.name, "post");
        assert_eq!(seed.content, "Write {content}");
    }

    #[test]
    fn test_parse_body_keeps_later_delimiters() {
        let content = "---\nname: post\ntype: drafts\n---\nIntro\n---\nOutro {content}";
        let seed = SeedLoader::parse(content).unwrap();
        assert_eq!(seed.content, "Intro\n---\nOutro {content}");
    }

    #[test]
    fn test_parse_ignores_extra_metadata_keys() {
        let content = "---\nname: post\ntype: drafts\nauthor: ana\ntags: [a, b]\n---\nWrite {content}";
        assert!(SeedLoader::parse(content).is_ok());
    }

    #[test]
    fn test_parse_rejections() {
        let cases = [
            ("Write {content}", SeedRejection::MissingFrontMatter),
            ("---\nname: post\ntype: drafts\nWrite", SeedRejection::MissingFrontMatter),
            (
                "intro\n---\nname: post\ntype: drafts\n---\nWrite",
                SeedRejection::ContentBeforeFrontMatter,
            ),
            ("---\ntype: drafts\n---\nWrite", SeedRejection::MissingName),
            ("---\nname: '   '\ntype: drafts\n---\nWrite", SeedRejection::MissingName),
            ("---\n---\nWrite", SeedRejection::MissingName),
            ("---\nname: post\n---\nWrite", SeedRejection::MissingType),
            ("---\nname: post\ntype: ' '\n---\nWrite", SeedRejection::MissingType),
            (
                "---\nname: post\ntype: articles\n---\nWrite",
                SeedRejection::UnknownType("articles".to_string()),
            ),
            ("---\nname: post\ntype: drafts\n---\n  \n\t\n", SeedRejection::EmptyBody),
        ];

        for (content, expected) in cases {
            assert_eq!(SeedLoader::parse(content), Err(expected), "content: {content:?}");
        }
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let content = "---\nname: [unclosed\ntype: drafts\n---\nWrite";
        assert!(matches!(
            SeedLoader::parse(content),
            Err(SeedRejection::InvalidMetadata(_))
        ));
    }

    #[test]
    fn test_delimiter_must_be_whole_line() {
        let content = "--- \nname: post\ntype: drafts\n----\nWrite";
        assert_eq!(
            SeedLoader::parse(content),
            Err(SeedRejection::MissingFrontMatter)
        );
    }

    #[test]
    fn test_is_seed_file() {
        assert!(SeedLoader::is_seed_file(Path::new("a/post.md")));
        assert!(!SeedLoader::is_seed_file(Path::new("a/post.old.md")));
        assert!(!SeedLoader::is_seed_file(Path::new("a/post.txt")));
        assert!(!SeedLoader::is_seed_file(Path::new("a/md")));
    }

    #[test]
    fn test_load_directory_recursive_and_filtered() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "weekly.md", VALID_IDEAS);
        write(
            dir.path(),
            "drafts/post.md",
            "---\nname: post\ntype: drafts\n---\nWrite {content}",
        );
        write(dir.path(), "drafts/post.old.md", "---\nname: old\ntype: drafts\n---\nOld {content}");
        write(dir.path(), "notes.txt", VALID_IDEAS);
        write(dir.path(), "broken.md", "no front matter here");

        let report = SeedLoader::load_with_report(dir.path()).unwrap();

        let mut names: Vec<_> = report.seeds.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["post", "weekly"]);
        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].0.ends_with("broken.md"));
    }

    #[test]
    fn test_load_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let result = SeedLoader::load_from_directory(dir.path().join("missing"));
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(SeedLoader::load_from_directory(dir.path()).unwrap().is_empty());
    }
}
