//! Error type identity - the nodes of the classification taxonomy.
//!
//! An `ErrorType` is identified by the pair `(namespace, identifier)` and
//! optionally points at a parent. Downstream routers branch on these nodes
//! instead of on raw faults: "continue when the type is-a CONNECTIVITY".
//!
//! # Namespace Structure
//!
//! - **CORE**: Built-in runtime taxonomy (see `definitions`)
//! - Anything else: Custom namespaces registered by extensions at startup
//!
//! # Identity vs. Structure
//!
//! Two `ErrorType` values are equal when their namespace and identifier match.
//! The parent link is structure, not identity: it is fixed at registration and
//! never compared. Cloning is an atomic refcount increment, so resolved
//! classifications can be attached to events without copying the tree.
//!
//! # Example
//!
//! ```rust
//! use faultline::ErrorTypeRepository;
//!
//! let repo = ErrorTypeRepository::builder().build();
//! let connectivity = repo.connectivity();
//!
//! assert_eq!(connectivity.to_string(), "CORE:CONNECTIVITY");
//! assert!(connectivity.is_a(repo.any()));
//! assert!(!connectivity.is_a(repo.critical()));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Canonical namespace names.
pub mod namespaces {
    /// Process-wide root namespace holding every built-in error type.
    pub const CORE: &str = "CORE";
}

// ============================================================================
// Error Type (Taxonomy Node)
// ============================================================================

struct Node {
    namespace: Cow<'static, str>,
    identifier: Cow<'static, str>,
    parent: Option<ErrorType>,
}

/// A node in the shared error classification taxonomy.
///
/// # Construction
///
/// Only an `ErrorTypeRepositoryBuilder` creates error types. This keeps the
/// parent graph acyclic: a parent must already exist before its child can be
/// registered, and nodes are never mutated afterwards.
///
/// # Thread Safety
///
/// `ErrorType` is `Send + Sync`; the node is shared immutably behind an `Arc`.
#[derive(Clone)]
pub struct ErrorType {
    node: Arc<Node>,
}

impl ErrorType {
    pub(crate) fn new(
        namespace: impl Into<Cow<'static, str>>,
        identifier: impl Into<Cow<'static, str>>,
        parent: Option<ErrorType>,
    ) -> Self {
        Self {
            node: Arc::new(Node {
                namespace: namespace.into(),
                identifier: identifier.into(),
                parent,
            }),
        }
    }

    /// Namespace this type was registered under.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.node.namespace
    }

    /// Identifier within the namespace.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.node.identifier
    }

    /// Direct parent, or `None` for roots.
    #[inline]
    pub fn parent(&self) -> Option<&ErrorType> {
        self.node.parent.as_ref()
    }

    /// Whether this type has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Iterate over this type and then every ancestor, nearest first.
    ///
    /// ```rust
    /// # use faultline::ErrorTypeRepository;
    /// let repo = ErrorTypeRepository::builder().build();
    /// let path: Vec<String> = repo
    ///     .lookup("CORE", "CLIENT_SECURITY")
    ///     .unwrap()
    ///     .ancestors()
    ///     .map(|t| t.identifier().to_owned())
    ///     .collect();
    /// assert_eq!(path, ["CLIENT_SECURITY", "SECURITY", "ANY"]);
    /// ```
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// True iff `other` is this type or one of its ancestors.
    pub fn is_a(&self, other: &ErrorType) -> bool {
        self.ancestors().any(|t| t == other)
    }

    /// Number of parent links between this type and its root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    #[inline]
    pub(crate) fn same_node(&self, other: &ErrorType) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

/// Iterator returned by [`ErrorType::ancestors`].
pub struct Ancestors<'a> {
    next: Option<&'a ErrorType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ErrorType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
            || (self.node.namespace == other.node.namespace
                && self.node.identifier == other.node.identifier)
    }
}

impl Eq for ErrorType {}

impl Hash for ErrorType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.namespace.hash(state);
        self.node.identifier.hash(state);
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node.namespace, self.node.identifier)
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent() {
            Some(parent) => write!(f, "ErrorType({} < {})", self, parent),
            None => write!(f, "ErrorType({})", self),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
