//! Declarative macros for taxonomy tables and fault chains.
//!
//! # Usage
//!
//! ```rust
//! use faultline::{fault_chain, ErrorTypeRepository, Fault, FaultKind};
//!
//! mod http {
//!     faultline::define_error_types! {
//!         "HTTP" => DEFINITIONS {
//!             /// Remote refused the connection.
//!             CONNECTION_REFUSED < CONNECTIVITY,
//!             NOT_FOUND,
//!             GONE < NOT_FOUND,
//!         }
//!     }
//! }
//!
//! let mut builder = ErrorTypeRepository::builder();
//! builder.register_definitions(http::DEFINITIONS).unwrap();
//! let repo = builder.build();
//!
//! let refused = repo.lookup("HTTP", http::CONNECTION_REFUSED).unwrap();
//! assert!(repo.is_assignable_to(&refused, repo.connectivity()));
//!
//! let chain = fault_chain![
//!     Fault::new(FaultKind::PLAIN),
//!     Fault::new(FaultKind::CONNECTIVITY),
//!     Fault::fatal("stop"),
//! ];
//! assert_eq!(chain.chain().count(), 3);
//! ```
//!
//! # Rules
//!
//! 1. Identifiers are Rust identifiers, so they are valid constant names and
//!    cannot contain separators
//! 2. A parent is named by identifier and resolved first in the declaring
//!    namespace, then in `CORE`
//! 3. Entries register in declaration order, so a local parent must be
//!    declared before its children

/// Declare the error types of one namespace.
///
/// Expands to one `pub const NAME: &str` per identifier plus a
/// `pub const TABLE: &[ErrorTypeDefinition]` for
/// `ErrorTypeRepositoryBuilder::register_definitions`.
///
/// # Example
///
/// ```rust
/// # use faultline::define_error_types;
/// define_error_types! {
///     "DB" => DB_TYPES {
///         QUERY < CONNECTIVITY,
///         BAD_SQL < QUERY,
///     }
/// }
///
/// assert_eq!(QUERY, "QUERY");
/// assert_eq!(DB_TYPES[1].parent, Some("QUERY"));
/// ```
#[macro_export]
macro_rules! define_error_types {
    ($namespace:expr => $table:ident {
        $( $(#[$meta:meta])* $name:ident $(< $parent:ident)? ),+ $(,)?
    }) => {
        $(
            $(#[$meta])*
            pub const $name: &str = stringify!($name);
        )+

        #[allow(missing_docs)]
        pub const $table: &[$crate::ErrorTypeDefinition] = &[
            $(
                $crate::ErrorTypeDefinition {
                    namespace: $namespace,
                    identifier: stringify!($name),
                    parent: $crate::__error_type_parent!($($parent)?),
                },
            )+
        ];
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __error_type_parent {
    () => {
        ::core::option::Option::None
    };
    ($parent:ident) => {
        ::core::option::Option::Some(stringify!($parent))
    };
}

/// Build a causal chain, outermost fault first.
///
/// Each fault's existing cause is replaced by the next one; the last fault
/// keeps its own.
///
/// # Example
///
/// ```rust
/// # use faultline::{fault_chain, Fault};
/// let fault = fault_chain![Fault::severe("not expected"), Fault::severe("expected")];
/// assert_eq!(fault.root_cause().message(), Some("expected"));
/// ```
#[macro_export]
macro_rules! fault_chain {
    ($fault:expr $(,)?) => {
        $fault
    };
    ($outer:expr, $($rest:expr),+ $(,)?) => {
        $crate::Fault::caused_by($outer, $crate::fault_chain!($($rest),+))
    };
}

// ============================================================================
// Tests
// ============================================================================
