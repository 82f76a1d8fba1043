use std::fmt;

use thiserror::Error;

/// Where a configuration or validation failure happened.
///
/// Rendered after the message as `(field: .., details: .., source: ..)`,
/// skipping whatever is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Offending key, e.g. `model_parameters.guided_choice`
    pub field_path: Option<String>,
    /// What was expected or what was found instead
    pub details: Option<String>,
    /// Component that rejected the input, e.g. `model_parameters`
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn at(field_path: impl Into<String>) -> Self {
        Self {
            field_path: Some(field_path.into()),
            ..Self::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labelled = [
            ("field", &self.field_path),
            ("details", &self.details),
            ("source", &self.source),
        ];
        let mut open = false;
        for (label, value) in labelled {
            if let Some(value) = value {
                f.write_str(if open { ", " } else { " (" })?;
                write!(f, "{}: {}", label, value)?;
                open = true;
            }
        }
        if open {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Errors surfaced by the adapter.
///
/// Directive extraction failures never surface here; they are handled by
/// [`crate::guided::ExtractionError`] and degrade to a no-op.
#[derive(Debug, Error)]
pub enum Error {
    /// A builder setting or environment variable could not be understood.
    #[error("Configuration error: {message}{context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Request data rejected at the boundary.
    #[error("Validation error: {message}{context}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// Raised by the wrapped completion client (network, auth, backend rejection).
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },
}

impl Error {
    pub fn configuration(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn validation(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Wrap a failure reported by the inner client.
    pub fn upstream(msg: impl Into<String>, status: Option<u16>) -> Self {
        Error::Upstream {
            message: msg.into(),
            status,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            Error::Upstream { .. } => None,
        }
    }
}
