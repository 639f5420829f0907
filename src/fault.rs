//! Faults - one link of a causal chain of raised errors.
//!
//! # Kinds
//!
//! Every fault carries a closed [`FaultKind`] tag assigned at construction.
//! Mappers match on that tag instead of introspecting concrete error types,
//! which keeps mapping tables small, hashable and exhaustively testable.
//!
//! - `FatalSignal`: raised only by the runtime itself to demand a stop
//! - `GenericSevere`: broad unrecoverable runtime condition (resource
//!   exhaustion, linkage failure)
//! - `Domain(name)`: everything else, identified by a stable name
//!
//! # Ownership
//!
//! A fault owns its cause by value, so a chain is always finite and acyclic:
//! there is no way to make a fault its own ancestor. Chains are still walked
//! through a bounded iterator to cap worst-case traversal cost.
//!
//! # Message Hygiene
//!
//! Fault messages may quote payload fragments. Owned messages are zeroized
//! when the fault drops; borrowed `'static` messages are assumed to be
//! literals and are left untouched.
//!
//! # Example
//!
//! ```rust
//! use faultline::{Fault, FaultKind};
//!
//! let fault = Fault::new(FaultKind::PLAIN)
//!     .caused_by(Fault::new(FaultKind::CONNECTIVITY).with_message("connection refused"));
//!
//! let kinds: Vec<&str> = fault.chain().map(|f| f.kind().name()).collect();
//! assert_eq!(kinds, ["Fault", "ConnectivityFault"]);
//! ```

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io;
use zeroize::Zeroize;

/// Default cap on how many links of a causal chain are inspected.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 64;

// ============================================================================
// Fault Kind
// ============================================================================

/// Closed classification tag carried by every fault.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Dedicated "this must stop the system" marker, raised only by the runtime.
    FatalSignal,
    /// Unrecoverable runtime-level fault of no more specific kind.
    GenericSevere,
    /// Domain-specific kind identified by a stable name.
    Domain(Cow<'static, str>),
}

impl FaultKind {
    /// Generic fault with no specific meaning.
    pub const PLAIN: FaultKind = FaultKind::Domain(Cow::Borrowed("Fault"));
    /// Connection could not be established or was lost.
    pub const CONNECTIVITY: FaultKind = FaultKind::Domain(Cow::Borrowed("ConnectivityFault"));
    /// Payload transformation failed.
    pub const TRANSFORMATION: FaultKind = FaultKind::Domain(Cow::Borrowed("TransformationFault"));
    /// Expression evaluation failed.
    pub const EXPRESSION: FaultKind = FaultKind::Domain(Cow::Borrowed("ExpressionFault"));
    /// Input was rejected.
    pub const VALIDATION: FaultKind = FaultKind::Domain(Cow::Borrowed("ValidationFault"));
    /// No route could be selected.
    pub const ROUTING: FaultKind = FaultKind::Domain(Cow::Borrowed("RoutingFault"));
    /// Authentication or authorization failed.
    pub const SECURITY: FaultKind = FaultKind::Domain(Cow::Borrowed("SecurityFault"));
    /// Deadline exceeded.
    pub const TIMEOUT: FaultKind = FaultKind::Domain(Cow::Borrowed("TimeoutFault"));
    /// Retry policy exhausted.
    pub const RETRY_EXHAUSTED: FaultKind = FaultKind::Domain(Cow::Borrowed("RetryExhaustedFault"));
    /// Redelivery policy exhausted.
    pub const REDELIVERY_EXHAUSTED: FaultKind =
        FaultKind::Domain(Cow::Borrowed("RedeliveryExhaustedFault"));
    /// Message rejected as a duplicate.
    pub const DUPLICATE_MESSAGE: FaultKind =
        FaultKind::Domain(Cow::Borrowed("DuplicateMessageFault"));
    /// Buffered stream exceeded its maximum size.
    pub const STREAM_MAXIMUM_SIZE_EXCEEDED: FaultKind =
        FaultKind::Domain(Cow::Borrowed("StreamMaximumSizeExceededFault"));
    /// Work refused because the runtime is overloaded.
    pub const OVERLOAD: FaultKind = FaultKind::Domain(Cow::Borrowed("OverloadFault"));
    /// I/O failure with no more specific classification.
    pub const IO: FaultKind = FaultKind::Domain(Cow::Borrowed("IoFault"));

    /// Create a domain kind from a stable name.
    #[inline]
    pub fn domain(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Domain(name.into())
    }

    /// Name rendered into resolved messages, e.g. `"ConnectivityFault"`.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Self::FatalSignal => "FatalSignal",
            Self::GenericSevere => "SevereFault",
            Self::Domain(name) => name,
        }
    }

    /// Whether this is the dedicated fatal signal.
    #[inline]
    pub const fn is_fatal_signal(&self) -> bool {
        matches!(self, Self::FatalSignal)
    }

    /// Whether this is a generic severe fault.
    #[inline]
    pub const fn is_generic_severe(&self) -> bool {
        matches!(self, Self::GenericSevere)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Fault Message
// ============================================================================

/// Human-readable fault message, zeroized on drop when owned.
#[derive(Clone, PartialEq, Eq)]
pub struct FaultMessage {
    value: Cow<'static, str>,
}

impl FaultMessage {
    /// Borrow the message text.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.value.as_ref()
    }

    /// Whether the message has no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<&'static str> for FaultMessage {
    fn from(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }
}

impl From<String> for FaultMessage {
    fn from(value: String) -> Self {
        Self {
            value: Cow::Owned(value),
        }
    }
}

impl From<Cow<'static, str>> for FaultMessage {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

impl Zeroize for FaultMessage {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for FaultMessage {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for FaultMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for FaultMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Fault
// ============================================================================

/// One raised error and, optionally, the fault that caused it.
///
/// Cloning, comparing, formatting and dropping walk the chain in a loop, so
/// arbitrarily long chains never exhaust the stack.
pub struct Fault {
    kind: FaultKind,
    message: Option<FaultMessage>,
    cause: Option<Box<Fault>>,
}

impl Fault {
    /// Create a fault with no message and no cause.
    #[inline]
    pub fn new(kind: FaultKind) -> Self {
        Self {
            kind,
            message: None,
            cause: None,
        }
    }

    /// Shorthand for a `GenericSevere` fault with a message.
    #[inline]
    pub fn severe(message: impl Into<FaultMessage>) -> Self {
        Self::new(FaultKind::GenericSevere).with_message(message)
    }

    /// Shorthand for a `FatalSignal` fault with a message.
    #[inline]
    pub fn fatal(message: impl Into<FaultMessage>) -> Self {
        Self::new(FaultKind::FatalSignal).with_message(message)
    }

    /// Attach a message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<FaultMessage>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the fault that caused this one, replacing any previous cause.
    #[inline]
    pub fn caused_by(mut self, cause: Fault) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Build a chain from faults listed outermost first.
    ///
    /// Any cause already attached to an element is replaced by the next
    /// element; the last element keeps its own cause. Returns `None` for an
    /// empty input.
    pub fn from_chain(faults: impl IntoIterator<Item = Fault>) -> Option<Fault> {
        let mut faults: Vec<Fault> = faults.into_iter().collect();
        let mut inner = faults.pop()?;
        while let Some(outer) = faults.pop() {
            inner = outer.caused_by(inner);
        }
        Some(inner)
    }

    /// Convert a standard I/O error, carrying its `source()` chain as causes.
    ///
    /// Connection-class kinds become `CONNECTIVITY`, `TimedOut` becomes
    /// `TIMEOUT`, `OutOfMemory` becomes `GenericSevere`; everything else is
    /// `IO`. Messages are tagged with the I/O kind label.
    pub fn from_io(err: &io::Error) -> Self {
        let fault = Self::new(io_fault_kind(err.kind()))
            .with_message(format!("{} [{:?}]", err, err.kind()));

        // Custom payloads are only descended into when they carry more than text.
        let cause = err.get_ref().and_then(|inner| match inner.downcast_ref::<io::Error>() {
            Some(io_err) => Some(Self::from_io(io_err)),
            None => inner.source().map(Self::from_source),
        });

        match cause {
            Some(cause) => fault.caused_by(cause),
            None => fault,
        }
    }

    fn from_source(err: &(dyn Error + 'static)) -> Self {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Self::from_io(io_err);
        }
        let fault = Self::new(FaultKind::PLAIN).with_message(err.to_string());
        match err.source() {
            Some(source) => fault.caused_by(Self::from_source(source)),
            None => fault,
        }
    }

    /// The fault's kind tag.
    #[inline]
    pub fn kind(&self) -> &FaultKind {
        &self.kind
    }

    /// The message, if one was attached (it may still be empty).
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(FaultMessage::as_str)
    }

    /// The direct cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&Fault> {
        self.cause.as_deref()
    }

    /// Walk this fault and its causes, outermost first, up to
    /// [`DEFAULT_MAX_CHAIN_DEPTH`] links.
    #[inline]
    pub fn chain(&self) -> Chain<'_> {
        self.chain_bounded(DEFAULT_MAX_CHAIN_DEPTH)
    }

    /// Walk at most `limit` links of the chain (minimum one).
    #[inline]
    pub fn chain_bounded(&self, limit: usize) -> Chain<'_> {
        Chain {
            next: Some(self),
            remaining: limit.max(1),
        }
    }

    /// The innermost fault reachable within the default depth bound.
    pub fn root_cause(&self) -> &Fault {
        self.chain().last().unwrap_or(self)
    }

    /// Every link of the chain with no depth bound.
    fn links(&self) -> impl Iterator<Item = &Fault> {
        std::iter::successors(Some(self), |fault| Fault::cause(fault))
    }

    fn clone_link(&self, cause: Option<Box<Fault>>) -> Self {
        Self {
            kind: self.kind.clone(),
            message: self.message.clone(),
            cause,
        }
    }
}

impl Clone for Fault {
    fn clone(&self) -> Self {
        let causes: Vec<&Fault> = self.links().skip(1).collect();
        let cause = causes
            .into_iter()
            .rev()
            .fold(None, |inner, link| Some(Box::new(link.clone_link(inner))));
        self.clone_link(cause)
    }
}

impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        self.links()
            .map(|f| (&f.kind, &f.message))
            .eq(other.links().map(|f| (&f.kind, &f.message)))
    }
}

impl Eq for Fault {}

impl Drop for Fault {
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(mut fault) = next {
            next = fault.cause.take();
        }
    }
}

/// Debug view of a single link, without its cause.
struct LinkDebug<'a>(&'a Fault);

impl fmt::Debug for LinkDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Fault");
        s.field("kind", &self.0.kind.name());
        if let Some(message) = &self.0.message {
            s.field("message", message);
        }
        s.finish()
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.links().map(LinkDebug)).finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) if !message.is_empty() => f.write_str(message),
            _ => f.write_str(self.kind.name()),
        }
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

// ============================================================================
// Chain Iterator
// ============================================================================

/// Bounded iterator over a causal chain, outermost first.
pub struct Chain<'a> {
    next: Option<&'a Fault>,
    remaining: usize,
}

impl<'a> Chain<'a> {
    /// Whether the walk stopped at the depth bound with faults left unvisited.
    #[inline]
    pub fn truncated(&self) -> bool {
        self.remaining == 0 && self.next.is_some()
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Fault;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = current.cause();
        Some(current)
    }
}

// ============================================================================
// I/O Conversion
// ============================================================================

fn io_fault_kind(kind: io::ErrorKind) -> FaultKind {
    match kind {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::BrokenPipe => FaultKind::CONNECTIVITY,
        io::ErrorKind::TimedOut => FaultKind::TIMEOUT,
        io::ErrorKind::OutOfMemory => FaultKind::GenericSevere,
        _ => FaultKind::IO,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(FaultKind::FatalSignal.name(), "FatalSignal");
        assert_eq!(FaultKind::GenericSevere.name(), "SevereFault");
        assert_eq!(FaultKind::CONNECTIVITY.name(), "ConnectivityFault");
        assert_eq!(FaultKind::domain("HttpFault").to_string(), "HttpFault");
    }

    #[test]
    fn domain_constant_equals_runtime_domain() {
        assert_eq!(FaultKind::CONNECTIVITY, FaultKind::domain("ConnectivityFault"));
        assert_eq!(
            FaultKind::CONNECTIVITY,
            FaultKind::domain(String::from("ConnectivityFault"))
        );
    }

    #[test]
    fn chain_walks_outermost_first() {
        let fault = Fault::new(FaultKind::PLAIN).caused_by(
            Fault::new(FaultKind::CONNECTIVITY).caused_by(Fault::fatal("stop")),
        );
        let kinds: Vec<&FaultKind> = fault.chain().map(Fault::kind).collect();
        assert_eq!(
            kinds,
            vec![&FaultKind::PLAIN, &FaultKind::CONNECTIVITY, &FaultKind::FatalSignal]
        );
        assert_eq!(fault.root_cause().message(), Some("stop"));
    }

    #[test]
    fn chain_bound_is_enforced() {
        let fault = Fault::from_chain((0..10).map(|_| Fault::severe("x"))).unwrap();
        let mut chain = fault.chain_bounded(3);
        assert_eq!(chain.by_ref().count(), 3);
        assert!(chain.truncated());

        let mut full = fault.chain_bounded(10);
        assert_eq!(full.by_ref().count(), 10);
        assert!(!full.truncated());
    }

    #[test]
    fn zero_bound_still_visits_the_outer_fault() {
        let fault = Fault::severe("outer").caused_by(Fault::severe("inner"));
        assert_eq!(fault.chain_bounded(0).count(), 1);
    }

    #[test]
    fn from_chain_links_in_order() {
        let fault = Fault::from_chain([
            Fault::severe("a"),
            Fault::severe("b"),
            Fault::severe("c"),
        ])
        .unwrap();
        let messages: Vec<&str> = fault.chain().filter_map(Fault::message).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert!(Fault::from_chain(Vec::new()).is_none());
    }

    #[test]
    fn display_falls_back_to_kind_name() {
        assert_eq!(Fault::new(FaultKind::TIMEOUT).to_string(), "TimeoutFault");
        assert_eq!(
            Fault::new(FaultKind::TIMEOUT).with_message("").to_string(),
            "TimeoutFault"
        );
        assert_eq!(Fault::severe("boom").to_string(), "boom");
    }

    #[test]
    fn error_source_follows_cause() {
        let fault = Fault::severe("outer").caused_by(Fault::severe("inner"));
        let source = fault.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("inner"));
    }

    #[test]
    fn from_io_maps_connection_kinds() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let fault = Fault::from_io(&err);
        assert_eq!(fault.kind(), &FaultKind::CONNECTIVITY);
        assert_eq!(fault.message(), Some("refused [ConnectionRefused]"));
    }

    #[test]
    fn from_io_maps_timeouts_and_memory() {
        let timeout = Fault::from_io(&io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert_eq!(timeout.kind(), &FaultKind::TIMEOUT);

        let oom = Fault::from_io(&io::Error::new(io::ErrorKind::OutOfMemory, "oom"));
        assert_eq!(oom.kind(), &FaultKind::GenericSevere);

        let other = Fault::from_io(&io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(other.kind(), &FaultKind::IO);
    }

    #[test]
    fn from_io_carries_nested_io_source() {
        let inner = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let outer = io::Error::new(io::ErrorKind::Other, inner);
        let fault = Fault::from_io(&outer);

        assert_eq!(fault.kind(), &FaultKind::IO);
        let cause = fault.cause().unwrap();
        assert_eq!(cause.kind(), &FaultKind::CONNECTIVITY);
        assert_eq!(cause.message(), Some("reset [ConnectionReset]"));
    }

    #[test]
    fn long_chain_clones_compares_and_drops() {
        let fault = Fault::from_chain((0..200_000).map(|i| {
            Fault::new(FaultKind::PLAIN).with_message(format!("link {i}"))
        }))
        .unwrap();

        let copy = fault.clone();
        assert_eq!(copy, fault);
        assert_eq!(copy.links().count(), 200_000);
        assert_eq!(copy.root_cause().message(), Some("link 63"));

        let shorter = Fault::from_chain((0..199_999).map(|i| {
            Fault::new(FaultKind::PLAIN).with_message(format!("link {i}"))
        }))
        .unwrap();
        assert_ne!(shorter, fault);

        drop(copy);
        drop(fault);
    }

    #[test]
    fn debug_lists_links_outermost_first() {
        let fault = Fault::severe("outer").caused_by(Fault::new(FaultKind::TIMEOUT));
        assert_eq!(
            format!("{:?}", fault),
            r#"[Fault { kind: "SevereFault", message: "outer" }, Fault { kind: "TimeoutFault" }]"#
        );
    }

    #[test]
    fn fault_message_zeroizes_owned() {
        let mut message = FaultMessage::from(String::from("secret payload"));
        message.zeroize();
        assert_eq!(message.as_str(), "");
    }

    #[test]
    fn fault_message_keeps_borrowed() {
        let mut message = FaultMessage::from("static");
        message.zeroize();
        assert_eq!(message.as_str(), "static");
    }
}
