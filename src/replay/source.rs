use std::path::{Component, Path, PathBuf};

use super::parser::{DelimitedTextParser, LogParser, StructuredParser};

type Result<T> = std::result::Result<T, SourceError>;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Invalid transcript name: {0}")]
    InvalidName(String),

    #[error("Transcript {name} not found")]
    NotFound { name: String },

    #[error("Failed to read transcript {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// On-disk or inline layout of a recorded transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// `<commands>;<responses>` lines
    Delimited,
    /// JSON array of `{ "commands": [...], "responses": [...] }`
    Structured,
}

impl TranscriptFormat {
    pub fn parser(self) -> &'static dyn LogParser {
        match self {
            Self::Delimited => &DelimitedTextParser,
            Self::Structured => &StructuredParser,
        }
    }
}

/// Where a transcript comes from. Each input channel implies its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    /// Structured transcript text handed over directly by the harness
    Inline(String),
    /// Name of a delimited transcript file inside the transcript directory
    File(String),
}

/// Transcript text read fully into memory, ready to be loaded into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// File name the transcript was read from, `None` for inline transcripts
    pub name: Option<String>,
    pub format: TranscriptFormat,
    pub text: String,
}

impl TranscriptSource {
    /// Reads the transcript. File names are resolved relative to `transcript_dir`.
    pub async fn read(self, transcript_dir: &Path) -> Result<Transcript> {
        match self {
            Self::Inline(text) => Ok(Transcript {
                name: None,
                format: TranscriptFormat::Structured,
                text,
            }),
            Self::File(name) => {
                let path = resolve(transcript_dir, &name)?;
                tracing::debug!("Reading transcript from {}", path.display());

                let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        SourceError::NotFound { name: name.clone() }
                    } else {
                        SourceError::Io {
                            name: name.clone(),
                            source: e,
                        }
                    }
                })?;

                Ok(Transcript {
                    name: Some(name),
                    format: TranscriptFormat::Delimited,
                    text,
                })
            }
        }
    }
}

/// Joins `name` onto `dir`, refusing anything that could leave the directory.
fn resolve(dir: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    let is_plain = !name.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

    if !is_plain {
        return Err(SourceError::InvalidName(name.to_string()));
    }
    Ok(dir.join(relative))
}
