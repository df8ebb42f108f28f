//! Error Types
//!
//! This module defines the error taxonomy shared by every Boneweave crate.
//!
//! # Overview
//!
//! All four kinds are recoverable at the call site. None of them is fatal to
//! the controller cache, and a rejected call never mutates overlay state:
//!
//! - [`BoneError::NotApplicable`]: the entity, model or bone cannot be resolved right now
//! - [`BoneError::InvalidPayload`]: unknown mechanism or malformed value
//! - [`BoneError::CapabilityAbsent`]: the bone lacks the hit-box or display the call needs
//! - [`BoneError::TransientResolutionFailure`]: an asynchronous preparation step failed
//!
//! # Usage
//!
//! ```rust,ignore
//! use boneweave_core::errors::{BoneError, Result};
//!
//! fn lookup() -> Result<()> {
//!     Err(BoneError::not_applicable("model 'robot' on entity ..."))
//! }
//! ```

use thiserror::Error;

/// The error type for all Boneweave operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoneError {
    /// The entity, model instance or bone handle is not resolvable at the moment.
    #[error("Not applicable: {what} could not be resolved")]
    NotApplicable {
        /// Description of what failed to resolve
        what: String,
    },

    /// The mechanism name is unknown or its value has the wrong shape.
    #[error("Invalid payload for '{mechanism}': {reason}")]
    InvalidPayload {
        /// Mechanism (or request) name the payload was meant for
        mechanism: String,
        /// Human-readable description of the problem
        reason: String,
    },

    /// The bone does not expose the capability the operation needs.
    #[error("Bone '{bone}' has no {capability}")]
    CapabilityAbsent {
        /// The missing capability, e.g. "hit-box"
        capability: &'static str,
        /// Name of the bone that was asked
        bone: String,
    },

    /// An asynchronous preparatory step failed or timed out.
    #[error("Resolution failed: {reason}")]
    TransientResolutionFailure {
        /// Failure description reported by the resolver
        reason: String,
    },
}

/// Fieldless discriminant of [`BoneError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotApplicable,
    InvalidPayload,
    CapabilityAbsent,
    TransientResolutionFailure,
}

impl BoneError {
    pub fn not_applicable(what: impl Into<String>) -> Self {
        Self::NotApplicable { what: what.into() }
    }

    pub fn invalid_payload(mechanism: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            mechanism: mechanism.into(),
            reason: reason.into(),
        }
    }

    pub fn capability_absent(capability: &'static str, bone: impl Into<String>) -> Self {
        Self::CapabilityAbsent {
            capability,
            bone: bone.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::TransientResolutionFailure {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotApplicable { .. } => ErrorKind::NotApplicable,
            Self::InvalidPayload { .. } => ErrorKind::InvalidPayload,
            Self::CapabilityAbsent { .. } => ErrorKind::CapabilityAbsent,
            Self::TransientResolutionFailure { .. } => ErrorKind::TransientResolutionFailure,
        }
    }
}

/// Alias for `Result<T, BoneError>`.
pub type Result<T> = std::result::Result<T, BoneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            BoneError::not_applicable("bone").kind(),
            ErrorKind::NotApplicable
        );
        assert_eq!(
            BoneError::invalid_payload("tint", "not an integer").kind(),
            ErrorKind::InvalidPayload
        );
        assert_eq!(
            BoneError::capability_absent("hit-box", "seat").kind(),
            ErrorKind::CapabilityAbsent
        );
        assert_eq!(
            BoneError::transient("timeout").kind(),
            ErrorKind::TransientResolutionFailure
        );
    }

    #[test]
    fn messages_name_the_subject() {
        let err = BoneError::capability_absent("hit-box", "seat");
        assert_eq!(err.to_string(), "Bone 'seat' has no hit-box");

        let err = BoneError::invalid_payload("brightness", "expected 2 integers");
        assert_eq!(
            err.to_string(),
            "Invalid payload for 'brightness': expected 2 integers"
        );
    }
}
