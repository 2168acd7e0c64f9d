//! Résumé input: pasted text or one uploaded PDF, validated before any network call.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;

use crate::generation::prompts::{fill, ATTACHED_RESUME_TEMPLATE};
use crate::llm_client::Part;
use crate::record_store::FileData;

pub const PDF_MIME_TYPE: &str = "application/pdf";
const EXCERPT_CHARS: usize = 100;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please provide both a resume and a job description.")]
    MissingInput,

    #[error("Please provide questions.")]
    MissingQuestions,

    #[error("Only PDF files are supported (received '{0}').")]
    UnsupportedFileType(String),

    #[error("File is too large ({actual}). The maximum size is {limit}.")]
    FileTooLarge { actual: String, limit: String },

    #[error("The uploaded file is empty.")]
    EmptyFile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResumeInput {
    Text(String),
    Document {
        bytes: Bytes,
        mime_type: String,
        file_name: String,
    },
}

impl ResumeInput {
    /// `None` for blank text.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        (!text.is_empty()).then(|| ResumeInput::Text(text.to_string()))
    }

    /// Accepts a single PDF no larger than `max_bytes`.
    pub fn from_document(
        file_name: &str,
        mime_type: &str,
        bytes: Bytes,
        max_bytes: usize,
    ) -> Result<Self, ValidationError> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence != PDF_MIME_TYPE {
            return Err(ValidationError::UnsupportedFileType(mime_type.to_string()));
        }
        if bytes.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if bytes.len() > max_bytes {
            return Err(ValidationError::FileTooLarge {
                actual: format_megabytes(bytes.len()),
                limit: format_megabytes(max_bytes),
            });
        }
        Ok(ResumeInput::Document {
            bytes,
            mime_type: essence,
            file_name: file_name.to_string(),
        })
    }

    pub fn is_document(&self) -> bool {
        matches!(self, ResumeInput::Document { .. })
    }

    /// What goes into the prompt where the résumé body belongs.
    pub fn prompt_text(&self) -> String {
        match self {
            ResumeInput::Text(text) => text.clone(),
            ResumeInput::Document { file_name, .. } => {
                fill(ATTACHED_RESUME_TEMPLATE, &[("file_name", file_name.as_str())])
            }
        }
    }

    /// The prompt followed by the inline document, if there is one.
    pub fn parts(&self, prompt: String) -> Vec<Part> {
        let mut parts = vec![Part::Text(prompt)];
        if let ResumeInput::Document {
            bytes, mime_type, ..
        } = self
        {
            parts.push(Part::InlineData {
                mime_type: mime_type.clone(),
                data: STANDARD.encode(bytes),
            });
        }
        parts
    }

    /// Upload payload for the remote store. Text input has none.
    pub fn file_data(&self) -> Option<FileData> {
        match self {
            ResumeInput::Text(_) => None,
            ResumeInput::Document {
                bytes,
                mime_type,
                file_name,
            } => Some(FileData {
                base64: STANDARD.encode(bytes),
                mime_type: mime_type.clone(),
                name: file_name.clone(),
            }),
        }
    }

    /// Short description of where the résumé came from, kept with the saved entry.
    pub fn source_link(&self) -> String {
        match self {
            ResumeInput::Document { file_name, .. } => file_name.clone(),
            ResumeInput::Text(text) => {
                let excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
                if excerpt.len() < text.len() {
                    format!("{excerpt}...")
                } else {
                    excerpt
                }
            }
        }
    }
}

fn format_megabytes(bytes: usize) -> String {
    let mb = bytes as f64 / BYTES_PER_MB;
    if mb.fract() == 0.0 {
        format!("{mb:.0}MB")
    } else {
        format!("{mb:.1}MB")
    }
}
