//! # Errors
//!
//! Typed error taxonomy for the provider core.
//!
//! Every variant carries enough context (kind, field, operation, reference)
//! for the caller to diagnose the failure without re-running it. Nothing in
//! this crate downgrades an error to a log line.

use crate::convergence::WaitError;
use crate::model::SecretAttributes;
use crate::provider::TransportError;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A discriminator matched no registered variant (version skew or programming error)
    #[error("unrecognized {family} variant '{tag}'")]
    UnrecognizedVariant { family: &'static str, tag: String },

    /// The remote returned a different kind than the operation expected
    #[error("expected {family} kind '{expected}' but the remote returned '{actual}'")]
    KindMismatch {
        family: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// A wire payload or local attribute could not be converted
    #[error("{kind}: field '{field}': {message}")]
    Codec {
        kind: &'static str,
        field: &'static str,
        message: String,
    },

    /// Network, auth or server-side failure reported by the transport
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The resource does not exist (any more)
    #[error("{reference} not found")]
    NotFound { reference: String },

    /// The create call succeeded but the resource never became usable
    #[error("{reference} was created but did not become ready: {source}")]
    CreatedNotReady {
        reference: String,
        #[source]
        source: Box<WaitError<SecretAttributes>>,
    },

    /// The resource was created but a follow-up step (signing, read-back) failed
    #[error("{reference} was created but {step} failed: {source}")]
    CreatedIncomplete {
        reference: String,
        step: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// A persisted reference could not be split into its segments
    #[error("malformed reference '{reference}': expected {expected}")]
    BadReferenceFormat {
        reference: String,
        expected: &'static str,
    },

    /// The caller tried to change a field that cannot change after creation
    #[error("{kind}: field '{field}' cannot be changed after creation")]
    ImmutableFieldConflict {
        kind: &'static str,
        field: &'static str,
    },

    /// The reference points at a different instance than the client serves
    #[error("'{reference}' does not belong to instance {scope}")]
    ScopeMismatch { reference: String, scope: String },

    /// A duration attribute did not parse
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Provider configuration could not be used
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// True when the error means "the resource is absent"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Transport { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub(crate) fn codec(kind: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Error::Codec {
            kind,
            field,
            message: message.into(),
        }
    }

    pub(crate) fn transport(operation: &'static str, source: TransportError) -> Self {
        Error::Transport { operation, source }
    }
}
