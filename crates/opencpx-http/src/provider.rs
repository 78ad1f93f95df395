// crates/opencpx-http/src/provider.rs
// ============================================================================
// Module: Posture Provider
// Description: Hosting-application callback that builds a posture per request.
// Purpose: Decouple document assembly from the HTTP transport.
// Dependencies: opencpx-core, thiserror
// ============================================================================

//! ## Overview
//! The endpoint calls a [`PostureProvider`] once per request and encodes
//! whatever it returns. Any closure `Fn() -> Result<Posture, E>` with a
//! displayable error is a provider. Provider failures are opaque to clients:
//! the message is recorded in the audit log and never sent on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use opencpx_core::Posture;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Opaque hosting-application failure while building a posture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("posture provider failed: {message}")]
pub struct ProviderError {
    /// Failure description for the audit log.
    message: String,
}

impl ProviderError {
    /// Creates a provider error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// SECTION: Provider Trait
// ============================================================================

/// Builds the posture document served for a request.
pub trait PostureProvider: Send + Sync {
    /// Returns a freshly built posture.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the posture cannot be assembled.
    fn posture(&self) -> Result<Posture, ProviderError>;
}

impl<F, E> PostureProvider for F
where
    F: Fn() -> Result<Posture, E> + Send + Sync,
    E: fmt::Display,
{
    fn posture(&self) -> Result<Posture, ProviderError> {
        self().map_err(|err| ProviderError::new(err.to_string()))
    }
}
