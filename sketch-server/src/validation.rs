//! Input validation for untrusted request payloads.
//!
//! Request-level limits are checked here before anything reaches the
//! pipeline. Per-shape geometry problems are not: those are rejected one by
//! one inside the pipeline and reported back.

use sketch_core::DesignShape;
use thiserror::Error;

use crate::routes::ShapeInput;

/// Maximum request body size.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Maximum shapes in one request.
pub const MAX_SHAPES: usize = 10_000;
/// Maximum bytes of text attached to one shape.
pub const MAX_TEXT_LEN: usize = 4096;
/// Maximum length for component ids supplied by a design tool.
pub const MAX_ID_LEN: usize = 64;
/// Maximum length of a design shape kind.
pub const MAX_KIND_LEN: usize = 64;

/// Validation error types.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Too many shapes in the request.
    #[error("too many shapes (max {MAX_SHAPES})")]
    TooManyShapes,
    /// Text on one shape exceeds the maximum length.
    #[error("text of shape {0} too long (max {MAX_TEXT_LEN} bytes)")]
    TextTooLong(usize),
    /// Component id exceeds the maximum length.
    #[error("id of shape {0} too long (max {MAX_ID_LEN} chars)")]
    IdTooLong(usize),
    /// Component id contains invalid characters.
    #[error("id of shape {0} contains invalid characters")]
    IdInvalidChars(usize),
    /// Shape kind exceeds the maximum length.
    #[error("kind of shape {0} too long (max {MAX_KIND_LEN} chars)")]
    KindTooLong(usize),
}

impl ValidationError {
    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            ValidationError::TooManyShapes => "shape_count",
            ValidationError::TextTooLong(_) => "text",
            ValidationError::IdTooLong(_) | ValidationError::IdInvalidChars(_) => "id",
            ValidationError::KindTooLong(_) => "kind",
        }
    }
}

/// Check if a character is valid for ids (ASCII alphanumeric, hyphen, or underscore).
fn is_valid_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Validate the number of shapes in a request.
///
/// # Errors
///
/// Returns [`ValidationError::TooManyShapes`] above [`MAX_SHAPES`].
pub fn validate_shape_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_SHAPES {
        return Err(ValidationError::TooManyShapes);
    }
    Ok(())
}

/// Validate text attached to the shape at `index`.
///
/// # Errors
///
/// Returns [`ValidationError::TextTooLong`] above [`MAX_TEXT_LEN`] bytes.
pub fn validate_text(index: usize, text: &str) -> Result<(), ValidationError> {
    if text.len() > MAX_TEXT_LEN {
        return Err(ValidationError::TextTooLong(index));
    }
    Ok(())
}

/// Validate a component id supplied for the shape at `index`.
///
/// Valid ids:
/// - 1-64 characters
/// - ASCII alphanumeric, hyphen, underscore only
///
/// An empty id is accepted and treated as absent.
///
/// # Errors
///
/// Returns [`ValidationError::IdTooLong`] or [`ValidationError::IdInvalidChars`].
pub fn validate_id(index: usize, id: &str) -> Result<(), ValidationError> {
    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::IdTooLong(index));
    }
    if !id.chars().all(is_valid_id_char) {
        return Err(ValidationError::IdInvalidChars(index));
    }
    Ok(())
}

/// Validate a detection request.
///
/// # Errors
///
/// Returns the first limit violated.
pub fn validate_convert(shapes: &[ShapeInput]) -> Result<(), ValidationError> {
    validate_shape_count(shapes.len())?;
    for (index, shape) in shapes.iter().enumerate() {
        if let Some(text) = &shape.text {
            validate_text(index, text)?;
        }
    }
    Ok(())
}

/// Validate a design-tool request.
///
/// # Errors
///
/// Returns the first limit violated.
pub fn validate_design(shapes: &[DesignShape]) -> Result<(), ValidationError> {
    validate_shape_count(shapes.len())?;
    for (index, shape) in shapes.iter().enumerate() {
        if let Some(id) = &shape.id {
            validate_id(index, id)?;
        }
        if shape.kind.as_ref().is_some_and(|kind| kind.len() > MAX_KIND_LEN) {
            return Err(ValidationError::KindTooLong(index));
        }
        validate_text(index, &shape.text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(validate_id(0, "comp_001").is_ok());
        assert!(validate_id(0, "login-button").is_ok());
        assert!(validate_id(0, "A1").is_ok());
        assert!(validate_id(0, "").is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert!(validate_id(0, "has spaces").is_err());
        assert!(validate_id(0, "../../etc").is_err());
        assert!(validate_id(0, "<script>").is_err());
        assert!(validate_id(0, "naïve").is_err());
    }

    #[test]
    fn test_id_boundary() {
        assert!(validate_id(0, &"x".repeat(MAX_ID_LEN)).is_ok());
        assert!(matches!(
            validate_id(3, &"x".repeat(MAX_ID_LEN + 1)),
            Err(ValidationError::IdTooLong(3))
        ));
    }

    #[test]
    fn test_text_length() {
        assert!(validate_text(0, "Submit").is_ok());
        assert!(validate_text(0, &"x".repeat(MAX_TEXT_LEN)).is_ok());
        assert!(validate_text(0, &"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_shape_count() {
        assert!(validate_shape_count(0).is_ok());
        assert!(validate_shape_count(MAX_SHAPES).is_ok());
        assert!(validate_shape_count(MAX_SHAPES + 1).is_err());
    }

    #[test]
    fn test_validate_convert_reports_index() {
        let shapes = vec![
            ShapeInput::default(),
            ShapeInput {
                text: Some("x".repeat(MAX_TEXT_LEN + 1)),
                ..ShapeInput::default()
            },
        ];
        let err = validate_convert(&shapes).expect_err("should reject");
        assert!(matches!(err, ValidationError::TextTooLong(1)));
        assert_eq!(err.kind(), "text");
    }

    #[test]
    fn test_validate_design() {
        let ok = DesignShape {
            id: Some("save".to_string()),
            kind: Some("button".to_string()),
            ..DesignShape::default()
        };
        assert!(validate_design(std::slice::from_ref(&ok)).is_ok());

        let bad = DesignShape {
            id: Some("bad id".to_string()),
            ..ok
        };
        let err = validate_design(&[bad]).expect_err("should reject");
        assert!(matches!(err, ValidationError::IdInvalidChars(0)));
    }

    #[test]
    fn test_error_messages() {
        assert!(ValidationError::TooManyShapes.to_string().contains("10000"));
        assert!(ValidationError::TextTooLong(2).to_string().contains("4096"));
        assert!(ValidationError::IdTooLong(0).to_string().contains("64"));
    }
}
