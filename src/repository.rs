//! The error type repository - the immutable taxonomy tree.
//!
//! # Lifecycle
//!
//! 1. `ErrorTypeRepository::builder()` seeds the `CORE` built-ins
//! 2. Extensions register their custom namespaces on the builder
//! 3. `build()` freezes the tree; from then on it is only read
//!
//! A duplicate `(namespace, identifier)` pair is a configuration defect and
//! surfaces as `TaxonomyError::DuplicateType` during step 2. Callers are
//! expected to abort startup on it rather than continue with a partial tree.
//!
//! # Thread Safety
//!
//! The built repository holds no interior mutability and is `Send + Sync`.
//! Share it by reference (or inside an `Arc`) across resolver threads.
//!
//! # Example
//!
//! ```rust
//! use faultline::{ErrorTypeRepository, TaxonomyError};
//!
//! let mut builder = ErrorTypeRepository::builder();
//! let connectivity = builder.lookup("CORE", "CONNECTIVITY").unwrap();
//! let refused = builder
//!     .register("HTTP", "CONNECTION_REFUSED", Some(&connectivity))
//!     .unwrap();
//!
//! assert!(matches!(
//!     builder.register("HTTP", "CONNECTION_REFUSED", None),
//!     Err(TaxonomyError::DuplicateType { .. })
//! ));
//!
//! let repo = builder.build();
//! assert!(repo.is_assignable_to(&refused, repo.connectivity()));
//! assert!(repo.is_assignable_to(&refused, repo.any()));
//! ```

use crate::definitions::{BuiltinTypes, ErrorTypeDefinition};
use crate::types::{namespaces, ErrorType};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Taxonomy Errors
// ============================================================================

/// Failures raised while building or querying the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    /// `(namespace, identifier)` was already registered.
    #[error("error type {namespace}:{identifier} is already registered")]
    DuplicateType {
        /// Namespace of the rejected registration.
        namespace: String,
        /// Identifier of the rejected registration.
        identifier: String,
    },

    /// No error type is registered under `(namespace, identifier)`.
    #[error("error type {namespace}:{identifier} is not registered")]
    NotFound {
        /// Namespace that was searched.
        namespace: String,
        /// Identifier that was searched.
        identifier: String,
    },

    /// The requested parent is not part of this repository.
    #[error("parent {parent} of error type {namespace}:{identifier} is not registered")]
    UnknownParent {
        /// Namespace of the rejected registration.
        namespace: String,
        /// Identifier of the rejected registration.
        identifier: String,
        /// Rendered `NAMESPACE:IDENTIFIER` of the missing parent.
        parent: String,
    },
}

impl TaxonomyError {
    fn not_found(namespace: &str, identifier: &str) -> Self {
        Self::NotFound {
            namespace: namespace.to_owned(),
            identifier: identifier.to_owned(),
        }
    }
}

// ============================================================================
// Index
// ============================================================================

/// Registration-ordered storage with a two-level `namespace -> identifier` index.
///
/// The nested map lets lookups borrow `&str` keys without building a tuple.
#[derive(Default)]
struct TypeIndex {
    types: Vec<ErrorType>,
    by_name: HashMap<Cow<'static, str>, HashMap<Cow<'static, str>, usize>>,
}

impl TypeIndex {
    fn get(&self, namespace: &str, identifier: &str) -> Option<&ErrorType> {
        let position = *self.by_name.get(namespace)?.get(identifier)?;
        self.types.get(position)
    }

    fn insert(&mut self, error_type: ErrorType) {
        let position = self.types.len();
        self.by_name
            .entry(Cow::Owned(error_type.namespace().to_owned()))
            .or_default()
            .insert(Cow::Owned(error_type.identifier().to_owned()), position);
        self.types.push(error_type);
    }

    /// True iff `error_type` is the very node stored under its name.
    fn owns(&self, error_type: &ErrorType) -> bool {
        self.get(error_type.namespace(), error_type.identifier())
            .is_some_and(|stored| stored.same_node(error_type))
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Mutable staging area for the taxonomy. Consumed by [`build`](Self::build).
pub struct ErrorTypeRepositoryBuilder {
    index: TypeIndex,
    builtins: BuiltinTypes,
}

impl ErrorTypeRepositoryBuilder {
    fn new() -> Self {
        let builtins = BuiltinTypes::new();
        let mut index = TypeIndex::default();
        for error_type in builtins.in_registration_order() {
            index.insert(error_type.clone());
        }
        Self { index, builtins }
    }

    /// Register a new error type.
    ///
    /// # Errors
    ///
    /// - `DuplicateType` if `(namespace, identifier)` already exists
    /// - `UnknownParent` if `parent` was not registered through this builder
    pub fn register(
        &mut self,
        namespace: impl Into<Cow<'static, str>>,
        identifier: impl Into<Cow<'static, str>>,
        parent: Option<&ErrorType>,
    ) -> Result<ErrorType, TaxonomyError> {
        let namespace = namespace.into();
        let identifier = identifier.into();

        if self.index.get(&namespace, &identifier).is_some() {
            return Err(TaxonomyError::DuplicateType {
                namespace: namespace.into_owned(),
                identifier: identifier.into_owned(),
            });
        }

        if let Some(parent) = parent {
            if !self.index.owns(parent) {
                return Err(TaxonomyError::UnknownParent {
                    namespace: namespace.into_owned(),
                    identifier: identifier.into_owned(),
                    parent: parent.to_string(),
                });
            }
        }

        let error_type = ErrorType::new(namespace, identifier, parent.cloned());
        tracing::trace!(error_type = %error_type, "error type registered");
        self.index.insert(error_type.clone());
        Ok(error_type)
    }

    /// Register a table produced by [`define_error_types!`](crate::define_error_types).
    ///
    /// Parents are resolved in the declaring namespace first, then in `CORE`.
    /// Registration stops at the first failure; types registered before it
    /// remain in the builder.
    pub fn register_definitions(
        &mut self,
        definitions: &[ErrorTypeDefinition],
    ) -> Result<Vec<ErrorType>, TaxonomyError> {
        let mut registered = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let parent = match definition.parent {
                Some(parent) => Some(self.resolve_parent(definition, parent)?),
                None => None,
            };
            registered.push(self.register(
                definition.namespace,
                definition.identifier,
                parent.as_ref(),
            )?);
        }
        Ok(registered)
    }

    fn resolve_parent(
        &self,
        definition: &ErrorTypeDefinition,
        parent: &str,
    ) -> Result<ErrorType, TaxonomyError> {
        self.index
            .get(definition.namespace, parent)
            .or_else(|| self.index.get(namespaces::CORE, parent))
            .cloned()
            .ok_or_else(|| TaxonomyError::UnknownParent {
                namespace: definition.namespace.to_owned(),
                identifier: definition.identifier.to_owned(),
                parent: format!("{}:{}", definition.namespace, parent),
            })
    }

    /// Look up a type registered so far (built-ins included).
    pub fn lookup(&self, namespace: &str, identifier: &str) -> Result<ErrorType, TaxonomyError> {
        self.index
            .get(namespace, identifier)
            .cloned()
            .ok_or_else(|| TaxonomyError::not_found(namespace, identifier))
    }

    /// Freeze the taxonomy.
    pub fn build(self) -> ErrorTypeRepository {
        tracing::debug!(types = self.index.types.len(), "error type repository built");
        ErrorTypeRepository {
            index: self.index,
            builtins: self.builtins,
        }
    }
}

// ============================================================================
// Repository
// ============================================================================

/// Immutable taxonomy of error types.
pub struct ErrorTypeRepository {
    index: TypeIndex,
    builtins: BuiltinTypes,
}

impl ErrorTypeRepository {
    /// Start a builder seeded with the `CORE` built-ins.
    pub fn builder() -> ErrorTypeRepositoryBuilder {
        ErrorTypeRepositoryBuilder::new()
    }

    /// Look up a type by its identity.
    ///
    /// # Errors
    ///
    /// Returns `TaxonomyError::NotFound` (never panics) when nothing is
    /// registered under the pair. Callers usually fall back to the locator's
    /// default error type.
    pub fn lookup(&self, namespace: &str, identifier: &str) -> Result<ErrorType, TaxonomyError> {
        self.index
            .get(namespace, identifier)
            .cloned()
            .ok_or_else(|| TaxonomyError::not_found(namespace, identifier))
    }

    /// Whether `(namespace, identifier)` is registered.
    #[inline]
    pub fn contains(&self, namespace: &str, identifier: &str) -> bool {
        self.index.get(namespace, identifier).is_some()
    }

    /// True iff `target` is `error_type` itself or one of its ancestors.
    ///
    /// Used by routing predicates such as "continue when the type is-a
    /// CONNECTIVITY".
    #[inline]
    pub fn is_assignable_to(&self, error_type: &ErrorType, target: &ErrorType) -> bool {
        error_type.is_a(target)
    }

    /// Registered types in registration order, built-ins first.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorType> {
        self.index.types.iter()
    }

    /// Distinct namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.by_name.keys().map(|ns| ns.as_ref()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.types.len()
    }

    /// Always false: the built-ins are present in every repository.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.types.is_empty()
    }

    /// `CORE:ANY`, root of the recoverable types.
    #[inline]
    pub fn any(&self) -> &ErrorType {
        &self.builtins.any
    }

    /// `CORE:UNKNOWN`, the conventional default classification.
    #[inline]
    pub fn unknown(&self) -> &ErrorType {
        &self.builtins.unknown
    }

    /// `CORE:CRITICAL`, root of generic unrecoverable faults.
    #[inline]
    pub fn critical(&self) -> &ErrorType {
        &self.builtins.critical
    }

    /// `CORE:FATAL`, reserved for the fatal signal.
    #[inline]
    pub fn fatal(&self) -> &ErrorType {
        &self.builtins.fatal
    }

    /// `CORE:OVERLOAD`.
    #[inline]
    pub fn overload(&self) -> &ErrorType {
        &self.builtins.overload
    }

    /// `CORE:CONNECTIVITY`.
    #[inline]
    pub fn connectivity(&self) -> &ErrorType {
        &self.builtins.connectivity
    }

    /// `CORE:TRANSFORMATION`.
    #[inline]
    pub fn transformation(&self) -> &ErrorType {
        &self.builtins.transformation
    }

    /// `CORE:EXPRESSION`.
    #[inline]
    pub fn expression(&self) -> &ErrorType {
        &self.builtins.expression
    }

    /// `CORE:VALIDATION`.
    #[inline]
    pub fn validation(&self) -> &ErrorType {
        &self.builtins.validation
    }

    /// `CORE:ROUTING`.
    #[inline]
    pub fn routing(&self) -> &ErrorType {
        &self.builtins.routing
    }

    /// `CORE:COMPOSITE_ROUTING`.
    #[inline]
    pub fn composite_routing(&self) -> &ErrorType {
        &self.builtins.composite_routing
    }

    /// `CORE:SECURITY`.
    #[inline]
    pub fn security(&self) -> &ErrorType {
        &self.builtins.security
    }

    /// `CORE:CLIENT_SECURITY`.
    #[inline]
    pub fn client_security(&self) -> &ErrorType {
        &self.builtins.client_security
    }

    /// `CORE:SERVER_SECURITY`.
    #[inline]
    pub fn server_security(&self) -> &ErrorType {
        &self.builtins.server_security
    }

    /// `CORE:TIMEOUT`.
    #[inline]
    pub fn timeout(&self) -> &ErrorType {
        &self.builtins.timeout
    }

    /// `CORE:RETRY_EXHAUSTED`.
    #[inline]
    pub fn retry_exhausted(&self) -> &ErrorType {
        &self.builtins.retry_exhausted
    }

    /// `CORE:REDELIVERY_EXHAUSTED`.
    #[inline]
    pub fn redelivery_exhausted(&self) -> &ErrorType {
        &self.builtins.redelivery_exhausted
    }

    /// `CORE:DUPLICATE_MESSAGE`.
    #[inline]
    pub fn duplicate_message(&self) -> &ErrorType {
        &self.builtins.duplicate_message
    }

    /// `CORE:STREAM_MAXIMUM_SIZE_EXCEEDED`.
    #[inline]
    pub fn stream_maximum_size_exceeded(&self) -> &ErrorType {
        &self.builtins.stream_maximum_size_exceeded
    }
}

impl fmt::Debug for ErrorTypeRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorTypeRepository")
            .field("types", &self.index.types.len())
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;

    #[test]
    fn builtins_are_registered() {
        let repo = ErrorTypeRepository::builder().build();
        assert_eq!(repo.len(), 19);
        assert!(!repo.is_empty());
        assert_eq!(repo.namespaces(), vec!["CORE"]);
        assert_eq!(
            repo.lookup("CORE", definitions::CONNECTIVITY).unwrap(),
            *repo.connectivity()
        );
    }

    #[test]
    fn lookup_returns_the_stored_node() {
        let repo = ErrorTypeRepository::builder().build();
        let found = repo.lookup("CORE", "FATAL").unwrap();
        assert!(found.same_node(repo.fatal()));
    }

    #[test]
    fn lookup_missing_is_not_found() {
        let repo = ErrorTypeRepository::builder().build();
        assert_eq!(
            repo.lookup("CORE", "NOPE"),
            Err(TaxonomyError::NotFound {
                namespace: "CORE".into(),
                identifier: "NOPE".into(),
            })
        );
        assert!(!repo.contains("HTTP", "ANY"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut builder = ErrorTypeRepository::builder();
        let err = builder.register("CORE", "ANY", None).unwrap_err();
        assert_eq!(err.to_string(), "error type CORE:ANY is already registered");
    }

    #[test]
    fn same_identifier_in_another_namespace_is_allowed() {
        let mut builder = ErrorTypeRepository::builder();
        let http_any = builder.register("HTTP", "ANY", None).unwrap();
        let repo = builder.build();
        assert_ne!(http_any, *repo.any());
        assert_eq!(repo.namespaces(), vec!["CORE", "HTTP"]);
    }

    #[test]
    fn foreign_parent_is_rejected() {
        let other = ErrorTypeRepository::builder().build();
        let mut builder = ErrorTypeRepository::builder();
        let err = builder
            .register("HTTP", "NOT_FOUND", Some(other.connectivity()))
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::UnknownParent { .. }));
    }

    #[test]
    fn custom_child_is_assignable_to_every_ancestor() {
        let mut builder = ErrorTypeRepository::builder();
        let security = builder.lookup("CORE", "SECURITY").unwrap();
        let unauthorized = builder
            .register("HTTP", "UNAUTHORIZED", Some(&security))
            .unwrap();
        let forbidden = builder
            .register("HTTP", "FORBIDDEN", Some(&security))
            .unwrap();
        let repo = builder.build();

        assert!(repo.is_assignable_to(&unauthorized, &unauthorized));
        assert!(repo.is_assignable_to(&unauthorized, repo.security()));
        assert!(repo.is_assignable_to(&unauthorized, repo.any()));
        assert!(!repo.is_assignable_to(&unauthorized, &forbidden));
        assert!(!repo.is_assignable_to(&unauthorized, repo.critical()));
    }

    #[test]
    fn register_definitions_resolves_local_then_core_parents() {
        let table = [
            ErrorTypeDefinition {
                namespace: "DB",
                identifier: "QUERY",
                parent: Some("CONNECTIVITY"),
            },
            ErrorTypeDefinition {
                namespace: "DB",
                identifier: "BAD_SQL",
                parent: Some("QUERY"),
            },
        ];
        let mut builder = ErrorTypeRepository::builder();
        let registered = builder.register_definitions(&table).unwrap();
        let repo = builder.build();

        assert_eq!(registered.len(), 2);
        let bad_sql = repo.lookup("DB", "BAD_SQL").unwrap();
        assert_eq!(bad_sql.parent().map(|p| p.to_string()), Some("DB:QUERY".into()));
        assert!(bad_sql.is_a(repo.connectivity()));
    }

    #[test]
    fn register_definitions_reports_missing_parent() {
        let table = [ErrorTypeDefinition {
            namespace: "DB",
            identifier: "QUERY",
            parent: Some("MISSING"),
        }];
        let mut builder = ErrorTypeRepository::builder();
        let err = builder.register_definitions(&table).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parent DB:MISSING of error type DB:QUERY is not registered"
        );
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut builder = ErrorTypeRepository::builder();
        builder.register("APP", "FIRST", None).unwrap();
        builder.register("APP", "SECOND", None).unwrap();
        let repo = builder.build();
        let tail: Vec<String> = repo.iter().skip(19).map(|t| t.to_string()).collect();
        assert_eq!(tail, vec!["APP:FIRST", "APP:SECOND"]);
    }
}
