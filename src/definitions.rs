//! Built-in error types of the `CORE` namespace.
//!
//! # Taxonomy
//!
//! ```text
//! ANY
//! ├── UNKNOWN
//! ├── CONNECTIVITY
//! ├── TRANSFORMATION
//! ├── EXPRESSION
//! ├── VALIDATION
//! ├── ROUTING
//! │   └── COMPOSITE_ROUTING
//! ├── SECURITY
//! │   ├── CLIENT_SECURITY
//! │   └── SERVER_SECURITY
//! ├── TIMEOUT
//! ├── RETRY_EXHAUSTED
//! ├── REDELIVERY_EXHAUSTED
//! ├── DUPLICATE_MESSAGE
//! └── STREAM_MAXIMUM_SIZE_EXCEEDED
//!
//! CRITICAL
//! ├── FATAL
//! └── OVERLOAD
//! ```
//!
//! `CRITICAL` is deliberately a separate root: a handler matching `ANY` must
//! not swallow unrecoverable failures. `FATAL` is reserved for the dedicated
//! fatal signal and is never produced by a mapper in the built-in locator
//! except for `FaultKind::FatalSignal`.
//!
//! # Governance
//!
//! Identifiers are string constants so routing predicates and extension
//! mappings can refer to them without a repository at hand. Custom namespaces
//! are declared with [`define_error_types!`](crate::define_error_types) and
//! registered through `ErrorTypeRepositoryBuilder::register_definitions`.

use crate::types::{namespaces, ErrorType};
use crate::ErrorTypeRepository;
use std::sync::OnceLock;

/// Root of every recoverable error type.
pub const ANY: &str = "ANY";
/// Fallback for faults no mapper recognizes.
pub const UNKNOWN: &str = "UNKNOWN";
/// Connection establishment or loss.
pub const CONNECTIVITY: &str = "CONNECTIVITY";
/// Payload transformation failures.
pub const TRANSFORMATION: &str = "TRANSFORMATION";
/// Expression evaluation failures.
pub const EXPRESSION: &str = "EXPRESSION";
/// Rejected input.
pub const VALIDATION: &str = "VALIDATION";
/// Routing decisions that could not be made.
pub const ROUTING: &str = "ROUTING";
/// Failures aggregated from several routes.
pub const COMPOSITE_ROUTING: &str = "COMPOSITE_ROUTING";
/// Security failures of either side.
pub const SECURITY: &str = "SECURITY";
/// Credentials rejected by a remote party.
pub const CLIENT_SECURITY: &str = "CLIENT_SECURITY";
/// Credentials rejected by this runtime.
pub const SERVER_SECURITY: &str = "SERVER_SECURITY";
/// Operation exceeded its deadline.
pub const TIMEOUT: &str = "TIMEOUT";
/// Retry policy gave up.
pub const RETRY_EXHAUSTED: &str = "RETRY_EXHAUSTED";
/// Redelivery policy gave up.
pub const REDELIVERY_EXHAUSTED: &str = "REDELIVERY_EXHAUSTED";
/// Idempotency check rejected a message.
pub const DUPLICATE_MESSAGE: &str = "DUPLICATE_MESSAGE";
/// Buffered stream outgrew its limit.
pub const STREAM_MAXIMUM_SIZE_EXCEEDED: &str = "STREAM_MAXIMUM_SIZE_EXCEEDED";
/// Root of unrecoverable runtime-level failures.
pub const CRITICAL: &str = "CRITICAL";
/// Reserved for the dedicated fatal signal.
pub const FATAL: &str = "FATAL";
/// Runtime refused work under load.
pub const OVERLOAD: &str = "OVERLOAD";

/// Declarative description of one error type, used by custom namespaces.
///
/// `parent` names a type in the same namespace, or a `CORE` type when the
/// identifier is not found in the declaring namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorTypeDefinition {
    /// Declaring namespace.
    pub namespace: &'static str,
    /// Identifier within the namespace.
    pub identifier: &'static str,
    /// Identifier of the parent type, `None` for a root.
    pub parent: Option<&'static str>,
}

/// The built-in nodes, constructed once per repository.
pub(crate) struct BuiltinTypes {
    pub(crate) any: ErrorType,
    pub(crate) unknown: ErrorType,
    pub(crate) connectivity: ErrorType,
    pub(crate) transformation: ErrorType,
    pub(crate) expression: ErrorType,
    pub(crate) validation: ErrorType,
    pub(crate) routing: ErrorType,
    pub(crate) composite_routing: ErrorType,
    pub(crate) security: ErrorType,
    pub(crate) client_security: ErrorType,
    pub(crate) server_security: ErrorType,
    pub(crate) timeout: ErrorType,
    pub(crate) retry_exhausted: ErrorType,
    pub(crate) redelivery_exhausted: ErrorType,
    pub(crate) duplicate_message: ErrorType,
    pub(crate) stream_maximum_size_exceeded: ErrorType,
    pub(crate) critical: ErrorType,
    pub(crate) fatal: ErrorType,
    pub(crate) overload: ErrorType,
}

impl BuiltinTypes {
    pub(crate) fn new() -> Self {
        let any = ErrorType::new(namespaces::CORE, ANY, None);
        let critical = ErrorType::new(namespaces::CORE, CRITICAL, None);
        let child = |identifier: &'static str, parent: &ErrorType| {
            ErrorType::new(namespaces::CORE, identifier, Some(parent.clone()))
        };

        let routing = child(ROUTING, &any);
        let security = child(SECURITY, &any);

        Self {
            unknown: child(UNKNOWN, &any),
            connectivity: child(CONNECTIVITY, &any),
            transformation: child(TRANSFORMATION, &any),
            expression: child(EXPRESSION, &any),
            validation: child(VALIDATION, &any),
            composite_routing: child(COMPOSITE_ROUTING, &routing),
            client_security: child(CLIENT_SECURITY, &security),
            server_security: child(SERVER_SECURITY, &security),
            timeout: child(TIMEOUT, &any),
            retry_exhausted: child(RETRY_EXHAUSTED, &any),
            redelivery_exhausted: child(REDELIVERY_EXHAUSTED, &any),
            duplicate_message: child(DUPLICATE_MESSAGE, &any),
            stream_maximum_size_exceeded: child(STREAM_MAXIMUM_SIZE_EXCEEDED, &any),
            fatal: child(FATAL, &critical),
            overload: child(OVERLOAD, &critical),
            routing,
            security,
            critical,
            any,
        }
    }

    /// Every built-in node, parents before children.
    pub(crate) fn in_registration_order(&self) -> [&ErrorType; 19] {
        [
            &self.any,
            &self.unknown,
            &self.connectivity,
            &self.transformation,
            &self.expression,
            &self.validation,
            &self.routing,
            &self.composite_routing,
            &self.security,
            &self.client_security,
            &self.server_security,
            &self.timeout,
            &self.retry_exhausted,
            &self.redelivery_exhausted,
            &self.duplicate_message,
            &self.stream_maximum_size_exceeded,
            &self.critical,
            &self.fatal,
            &self.overload,
        ]
    }
}

/// Process-wide repository holding only the built-in taxonomy.
///
/// Initialized on first access and read-only afterwards. Runtimes with custom
/// namespaces build their own repository at startup instead.
pub fn builtin_repository() -> &'static ErrorTypeRepository {
    static REPOSITORY: OnceLock<ErrorTypeRepository> = OnceLock::new();
    REPOSITORY.get_or_init(|| ErrorTypeRepository::builder().build())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registration_order_puts_parents_first() {
        let builtins = BuiltinTypes::new();
        let mut seen = HashSet::new();
        for t in builtins.in_registration_order() {
            if let Some(parent) = t.parent() {
                assert!(seen.contains(parent), "{} registered before {}", t, parent);
            }
            assert!(seen.insert(t.clone()), "{} registered twice", t);
        }
    }

    #[test]
    fn all_builtins_live_in_core() {
        let builtins = BuiltinTypes::new();
        assert!(
            builtins
                .in_registration_order()
                .iter()
                .all(|t| t.namespace() == namespaces::CORE)
        );
    }

    #[test]
    fn critical_is_separate_from_any() {
        let builtins = BuiltinTypes::new();
        assert!(builtins.critical.is_root());
        assert!(builtins.fatal.is_a(&builtins.critical));
        assert!(!builtins.fatal.is_a(&builtins.any));
        assert!(builtins.client_security.is_a(&builtins.security));
    }

    #[test]
    fn builtin_repository_is_shared() {
        let a = builtin_repository();
        let b = builtin_repository();
        assert!(std::ptr::eq(a, b));
        assert!(a.any().same_node(b.any()));
    }
}
