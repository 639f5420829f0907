//! Structured record of a single resolution.
//!
//! # Lifetime
//!
//! - Borrows from the `Resolution` that produced it
//! - Cannot outlive the fault chain it describes
//! - No heap allocations in accessors
//!
//! The record exists only for the duration of the logging call. Fault
//! messages stay inside their zeroizing `FaultMessage` storage; the record
//! never copies them except through `format_for_trusted_debug`.
//!
//! # Output Format
//!
//! ```text
//! [CORE:CRITICAL] branch=severe_chain component='core:logger' fault=SevereFault severe_depth=3
//! ```
//!
//! A bounded traversal appends ` [TRUNCATED_CHAIN]`.

use crate::fault::FaultKind;
use crate::resolver::ResolutionBranch;
use crate::types::ErrorType;
use std::borrow::Cow;
use std::fmt;

/// Longest rendering of any single field, marker included.
const MAX_LOG_FIELD_LEN: usize = 1024;

/// Appended to clipped fields.
const CLIPPED_MARKER: &str = "...[TRUNCATED]";

/// Structured log entry borrowed from a `Resolution`.
///
/// # Example
///
/// ```rust
/// # use faultline::{definitions, classify, ComponentId, ErrorTypeLocator, Fault, ResolverConfig};
/// let locator = ErrorTypeLocator::builtin(definitions::builtin_repository());
/// let fault = Fault::severe("disk full");
/// let component = ComponentId::from("file:write");
/// let resolution = classify(&fault, &component, None, &locator, &ResolverConfig::default());
///
/// let mut line = String::new();
/// resolution.log().write_to(&mut line).unwrap();
/// assert_eq!(
///     line,
///     "[CORE:CRITICAL] branch=single_severe component='file:write' fault=SevereFault severe_depth=1"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ResolutionLog<'a> {
    pub(crate) component: &'a str,
    pub(crate) branch: ResolutionBranch,
    pub(crate) error_type: &'a ErrorType,
    pub(crate) fault_kind: Option<&'a FaultKind>,
    pub(crate) fault_message: Option<&'a str>,
    pub(crate) severe_depth: usize,
    pub(crate) truncated: bool,
}

impl<'a> ResolutionLog<'a> {
    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Includes the used fault's message, which may quote payload data.
    /// Only available with BOTH the `trusted_debug` feature AND debug
    /// assertions enabled.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = String::new();
        self.write_to(&mut output).ok();
        if let Some(message) = self.fault_message {
            output.push_str(&format!(" message='{}'", clip_field(message)));
        }
        output
    }

    /// Write the record to `f` without the fault message.
    ///
    /// Fields are truncated at a UTF-8 boundary to bound output size.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] branch={} component='{}'",
            self.error_type,
            self.branch,
            clip_field(self.component)
        )?;

        if let Some(kind) = self.fault_kind {
            write!(f, " fault={}", clip_field(kind.name()))?;
        }

        if self.severe_depth > 0 {
            write!(f, " severe_depth={}", self.severe_depth)?;
        }

        if self.truncated {
            f.write_str(" [TRUNCATED_CHAIN]")?;
        }

        Ok(())
    }

    /// Access structured fields for JSON/structured logging.
    ///
    /// Fields are not truncated here; that is left to the logging framework.
    #[inline]
    pub const fn component(&self) -> &str {
        self.component
    }

    /// Rule that produced the resolution.
    #[inline]
    pub const fn branch(&self) -> ResolutionBranch {
        self.branch
    }

    /// Final classification.
    #[inline]
    pub const fn error_type(&self) -> &ErrorType {
        self.error_type
    }

    /// Kind of the used fault, `None` when the existing classification was kept.
    #[inline]
    pub const fn fault_kind(&self) -> Option<&FaultKind> {
        self.fault_kind
    }

    /// The used fault's message. May quote payload data.
    #[inline]
    pub const fn fault_message(&self) -> Option<&str> {
        self.fault_message
    }

    /// Length of the generic severe run on top of the chain.
    #[inline]
    pub const fn severe_depth(&self) -> usize {
        self.severe_depth
    }

    /// Whether the depth bound cut traversal short.
    #[inline]
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Display for ResolutionLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Clip `field` to [`MAX_LOG_FIELD_LEN`] bytes on a char boundary.
fn clip_field(field: &str) -> Cow<'_, str> {
    if field.len() <= MAX_LOG_FIELD_LEN {
        return Cow::Borrowed(field);
    }

    let budget = MAX_LOG_FIELD_LEN - CLIPPED_MARKER.len();
    let cut = field
        .char_indices()
        .map(|(idx, _)| idx)
        .take_while(|&idx| idx <= budget)
        .last()
        .unwrap_or(0);

    Cow::Owned(format!("{}{}", &field[..cut], CLIPPED_MARKER))
}
