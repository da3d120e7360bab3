use std::path::PathBuf;

use thiserror::Error;

/// Terminal failure of a health profile render. Any variant aborts the whole
/// document; no partial output is ever produced.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid health record: {0}")]
    Json(#[from] serde_json::Error),

    /// A font file could not be read, parsed, or embedded.
    #[error("font unavailable ({}): {reason}", path.display())]
    Font { path: PathBuf, reason: String },

    /// A list entry lacks a field the renderer has to dereference.
    #[error("{section}: entry is missing required field `{field}`")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("failed to write PDF: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_section_and_field() {
        let err = Error::MissingField {
            section: "Allergies",
            field: "reaction",
        };
        assert_eq!(
            err.to_string(),
            "Allergies: entry is missing required field `reaction`"
        );
    }

    #[test]
    fn font_error_includes_path() {
        let err = Error::Font {
            path: PathBuf::from("/fonts/Missing.ttf"),
            reason: "not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "font unavailable (/fonts/Missing.ttf): not found"
        );
    }
}
