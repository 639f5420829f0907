//! Values exchanged with the surrounding pipeline.
//!
//! # Architecture
//!
//! The resolver does not know how events travel through the runtime. It only
//! needs three things from the pipeline:
//!
//! - `ComponentId`: a stable, hashable name for the failing component
//! - `EventErrors`: read and replace the classification attached to an event
//! - `MessagingFault`: the raised fault chain bundled with its event and component
//!
//! `Event` is a minimal implementation of `EventErrors` for runtimes that
//! have no event type of their own, and for tests.
//!
//! # Error Replacement
//!
//! An event's `Error` is never patched field by field. Each resolution writes
//! a complete new value, so readers observe either the old classification or
//! the new one.

use crate::fault::Fault;
use crate::types::ErrorType;
use std::borrow::{Borrow, Cow};
use std::fmt;

// ============================================================================
// Component Identity
// ============================================================================

/// Qualified name of a processing component, e.g. `"http:request"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(Cow<'static, str>);

impl ComponentId {
    /// Create an identity from a qualified name.
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Borrow the qualified name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ComponentId {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for ComponentId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Resolved Classification
// ============================================================================

/// A resolved classification attached to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    error_type: ErrorType,
    cause: Option<Fault>,
}

impl Error {
    /// Classification with the fault that produced it.
    #[inline]
    pub fn new(error_type: ErrorType, cause: Option<Fault>) -> Self {
        Self { error_type, cause }
    }

    /// Classification with no recorded fault.
    #[inline]
    pub fn of_type(error_type: ErrorType) -> Self {
        Self::new(error_type, None)
    }

    /// The classification.
    #[inline]
    pub fn error_type(&self) -> &ErrorType {
        &self.error_type
    }

    /// The fault that produced the classification, if recorded.
    #[inline]
    pub fn cause(&self) -> Option<&Fault> {
        self.cause.as_ref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.error_type, cause),
            None => write!(f, "{}", self.error_type),
        }
    }
}

// ============================================================================
// Event Abstraction
// ============================================================================

/// Access to the classification slot of a pipeline event.
///
/// Writers to a single event must be serialized by the caller; the resolver
/// performs exactly one `set_error` per resolution.
pub trait EventErrors {
    /// The classification currently attached, if any.
    fn error(&self) -> Option<&Error>;

    /// Replace the attached classification.
    fn set_error(&mut self, error: Error);
}

impl<T: EventErrors + ?Sized> EventErrors for &mut T {
    #[inline]
    fn error(&self) -> Option<&Error> {
        (**self).error()
    }

    #[inline]
    fn set_error(&mut self, error: Error) {
        (**self).set_error(error)
    }
}

/// Minimal event carrying an identifier and a classification slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    id: Cow<'static, str>,
    error: Option<Error>,
}

impl Event {
    /// A fresh event with no classification.
    #[inline]
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            error: None,
        }
    }

    /// Builder-style attachment of a pre-existing classification.
    #[inline]
    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Event identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl EventErrors for Event {
    #[inline]
    fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    #[inline]
    fn set_error(&mut self, error: Error) {
        self.error = Some(error);
    }
}

// ============================================================================
// Messaging Fault
// ============================================================================

/// A raised fault chain bundled with the event and the component that failed.
///
/// Generic over the event so the pipeline can pass an owned event or a
/// `&mut` borrow of one.
#[derive(Debug, Clone)]
pub struct MessagingFault<E> {
    message: Cow<'static, str>,
    fault: Fault,
    event: E,
    component: ComponentId,
}

impl<E: EventErrors> MessagingFault<E> {
    /// Bundle a fault raised by `component` while processing `event`.
    pub fn new(
        message: impl Into<Cow<'static, str>>,
        fault: Fault,
        event: E,
        component: impl Into<ComponentId>,
    ) -> Self {
        Self {
            message: message.into(),
            fault,
            event,
            component: component.into(),
        }
    }

    /// Current message (the base message before resolution).
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Outermost fault of the causal chain.
    #[inline]
    pub fn fault(&self) -> &Fault {
        &self.fault
    }

    /// The event being processed.
    #[inline]
    pub fn event(&self) -> &E {
        &self.event
    }

    /// The component that raised the fault.
    #[inline]
    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    /// Give back the event.
    #[inline]
    pub fn into_event(self) -> E {
        self.event
    }

    pub(crate) fn into_parts(self) -> (Cow<'static, str>, Fault, E, ComponentId) {
        (self.message, self.fault, self.event, self.component)
    }

    pub(crate) fn from_parts(
        message: Cow<'static, str>,
        fault: Fault,
        event: E,
        component: ComponentId,
    ) -> Self {
        Self {
            message,
            fault,
            event,
            component,
        }
    }
}

impl<E: EventErrors> fmt::Display for MessagingFault<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E: EventErrors + fmt::Debug> std::error::Error for MessagingFault<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.fault)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::builtin_repository;
    use crate::fault::FaultKind;

    #[test]
    fn component_id_is_a_string_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ComponentId::from("http:request"), 1);
        assert_eq!(map.get("http:request"), Some(&1));
        assert_eq!(ComponentId::new(String::from("db:select")).to_string(), "db:select");
    }

    #[test]
    fn event_error_is_replaced_whole() {
        let repo = builtin_repository();
        let mut event = Event::new("evt-1").with_error(Error::new(
            repo.transformation().clone(),
            Some(Fault::new(FaultKind::TRANSFORMATION)),
        ));
        event.set_error(Error::of_type(repo.connectivity().clone()));

        let error = event.error().unwrap();
        assert_eq!(error.error_type(), repo.connectivity());
        assert!(error.cause().is_none());
    }

    #[test]
    fn borrowed_event_writes_through() {
        let repo = builtin_repository();
        fn attach(mut slot: impl EventErrors, error: Error) {
            slot.set_error(error);
        }

        let mut event = Event::new("evt-2");
        attach(&mut event, Error::of_type(repo.timeout().clone()));
        assert_eq!(event.error().map(Error::error_type), Some(repo.timeout()));
    }

    #[test]
    fn error_display_includes_cause() {
        let repo = builtin_repository();
        let error = Error::new(repo.critical().clone(), Some(Fault::severe("disk full")));
        assert_eq!(error.to_string(), "CORE:CRITICAL: disk full");
        assert_eq!(Error::of_type(repo.any().clone()).to_string(), "CORE:ANY");
    }

    #[test]
    fn messaging_fault_exposes_parts() {
        let mf = MessagingFault::new("base", Fault::severe("x"), Event::new("e"), "core:logger");
        assert_eq!(mf.message(), "base");
        assert_eq!(mf.component().as_str(), "core:logger");
        assert_eq!(mf.fault().kind(), &FaultKind::GenericSevere);
        assert_eq!(mf.to_string(), "base");
        assert_eq!(mf.into_event().id(), "e");
    }
}
