//! Error categories for logdigest.
//!
//! Most of the workspace speaks `anyhow::Result`. The errors here exist so the
//! binary and the tests can tell a bad invocation or an unsupported mode apart
//! from an unexpected failure after `downcast_ref::<DigestError>()`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid arguments or missing inputs, detected before any work starts.
    Precondition,
    /// A remote transfer could not be run.
    Transfer,
    Io,
    /// The metadata source is missing or malformed.
    Metadata,
    /// The requested digest mode does not exist for this driver.
    Unsupported,
    Parse,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Precondition => write!(f, "precondition"),
            ErrorCategory::Transfer => write!(f, "transfer"),
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Metadata => write!(f, "metadata"),
            ErrorCategory::Unsupported => write!(f, "unsupported"),
            ErrorCategory::Parse => write!(f, "parse"),
        }
    }
}

/// Digest error with category and key/value context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestError {
    message: String,
    category: ErrorCategory,
    context: Vec<(String, String)>,
}

impl DigestError {
    pub fn new(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            message: message.into(),
            category,
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    pub fn is_precondition(&self) -> bool {
        self.category == ErrorCategory::Precondition
    }

    pub fn is_unsupported(&self) -> bool {
        self.category == ErrorCategory::Unsupported
    }
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)?;

        if !self.context.is_empty() {
            write!(f, " (")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl std::error::Error for DigestError {}

pub fn precondition(message: impl Into<String>) -> DigestError {
    DigestError::new(message, ErrorCategory::Precondition)
}

pub fn unsupported(message: impl Into<String>) -> DigestError {
    DigestError::new(message, ErrorCategory::Unsupported)
}

pub fn metadata_error(message: impl Into<String>) -> DigestError {
    DigestError::new(message, ErrorCategory::Metadata)
}

pub fn transfer_error(message: impl Into<String>) -> DigestError {
    DigestError::new(message, ErrorCategory::Transfer)
}

pub fn io_error(message: impl Into<String>) -> DigestError {
    DigestError::new(message, ErrorCategory::Io)
}

pub fn parse_error(message: impl Into<String>) -> DigestError {
    DigestError::new(message, ErrorCategory::Parse)
}

/// Category of the first `DigestError` in an anyhow chain, if any.
pub fn category_of(err: &anyhow::Error) -> Option<ErrorCategory> {
    err.chain()
        .find_map(|e| e.downcast_ref::<DigestError>())
        .map(DigestError::category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn display_includes_category_and_context() {
        let err = precondition("working_dir must exist")
            .with_context("working_dir", "/nope")
            .with_context("logs_location", "aws");
        assert_eq!(
            err.to_string(),
            "[precondition] working_dir must exist (working_dir=/nope, logs_location=aws)"
        );
    }

    #[test]
    fn category_predicates() {
        assert!(precondition("x").is_precondition());
        assert!(unsupported("x").is_unsupported());
        assert!(!metadata_error("x").is_unsupported());
        assert_eq!(io_error("x").category(), ErrorCategory::Io);
        assert_eq!(parse_error("x").category(), ErrorCategory::Parse);
    }

    #[test]
    fn category_survives_anyhow_context() {
        let res: anyhow::Result<()> = Err(unsupported("csv digest").into());
        let err = res.context("running digest").unwrap_err();
        assert_eq!(category_of(&err), Some(ErrorCategory::Unsupported));
    }

    #[test]
    fn category_absent_for_foreign_errors() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(category_of(&err), None);
    }
}
