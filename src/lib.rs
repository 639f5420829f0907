//! # faultline
//!
//! Causal-chain error classification for message-processing runtimes.
//!
//! ## Design Philosophy
//!
//! 1. **Classify, never decide**: the engine picks one error type and one
//!    message; reacting to the failure is the caller's business
//! 2. **One taxonomy per process**: error types form an immutable tree built
//!    once at startup and shared by reference
//! 3. **Explicit precedence**: a fatal signal beats a severe chain, which
//!    beats an earlier classification, which beats the mappers
//! 4. **Closed kinds**: faults carry a `FaultKind` tag, so mapping tables
//!    never introspect concrete error types
//!
//! ## Moving Parts
//!
//! - [`ErrorTypeRepository`]: the taxonomy tree, seeded with the `CORE`
//!   built-ins (see [`definitions`])
//! - [`Fault`]: one link of a causal chain
//! - [`ExceptionMapper`]: fault kind to error type table
//! - [`ErrorTypeLocator`]: default mapper plus per-component overrides
//! - [`resolve`]: walks the chain and writes the final [`Error`] on the event
//!
//! ## Quick Start
//!
//! ```rust
//! use faultline::{
//!     resolve, ErrorTypeLocator, ErrorTypeRepository, Event, EventErrors, ExceptionMapper,
//!     Fault, FaultKind, MessagingFault,
//! };
//!
//! // Startup: extend the taxonomy and register a component-specific mapping.
//! let mut builder = ErrorTypeRepository::builder();
//! let connectivity = builder.lookup("CORE", "CONNECTIVITY")?;
//! let connection = builder.register("NS", "CONNECTION", Some(&connectivity))?;
//! let repo = builder.build();
//!
//! let locator = ErrorTypeLocator::builtin_builder(&repo)
//!     .add_component_mapper(
//!         "ns:operation",
//!         ExceptionMapper::builder()
//!             .add_mapping(FaultKind::CONNECTIVITY, connection.clone())
//!             .build(),
//!     )
//!     .build();
//!
//! // Runtime: a component raised a fault while processing an event.
//! let fault = Fault::new(FaultKind::CONNECTIVITY).with_message("CONNECTION PROBLEM");
//! let mf = MessagingFault::new("Messaging Error Message", fault, Event::new("evt-1"), "ns:operation");
//!
//! let resolved = resolve(mf, &locator);
//! assert_eq!(resolved.message(), "CONNECTION PROBLEM (ConnectivityFault).");
//! assert_eq!(resolved.event().error().map(|e| e.error_type()), Some(&connection));
//! assert!(repo.is_assignable_to(&connection, repo.connectivity()));
//! # Ok::<(), faultline::TaxonomyError>(())
//! ```
//!
//! ## Observability
//!
//! Resolutions emit `tracing` events at `debug` level. Hitting the chain depth
//! bound emits a `warn`. Structured records are available through
//! [`Resolution::log`] without materializing fault messages.
//!
//! ## Features
//!
//! - `trusted_debug`: enable `ResolutionLog::format_for_trusted_debug`, which
//!   includes fault messages (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::result;

pub mod convenience;
pub mod definitions;
pub mod fault;
pub mod locator;
pub mod logging;
pub mod mapper;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod types;

pub use definitions::{builtin_repository, ErrorTypeDefinition};
pub use fault::{Chain, Fault, FaultKind, FaultMessage, DEFAULT_MAX_CHAIN_DEPTH};
pub use locator::{ErrorTypeLocator, ErrorTypeLocatorBuilder};
pub use logging::ResolutionLog;
pub use mapper::{ExceptionMapper, ExceptionMapperBuilder};
pub use models::{ComponentId, Error, Event, EventErrors, MessagingFault};
pub use repository::{ErrorTypeRepository, ErrorTypeRepositoryBuilder, TaxonomyError};
pub use resolver::{
    classify, resolve, resolve_with, MessagingFaultResolver, Resolution, ResolutionBranch,
    ResolverConfig,
};
pub use types::{namespaces, Ancestors, ErrorType};

/// Type alias for taxonomy operations.
pub type Result<T> = result::Result<T, TaxonomyError>;
