//! The error type locator - per-component classification with fallbacks.
//!
//! # Fallback Order
//!
//! `classify(component, kind)` consults, in order:
//!
//! 1. the mapper registered for `component`, if any
//! 2. the default mapper
//! 3. the locator's default error type
//!
//! A mapper "answers" when its `map` returns `Some`, which includes the
//! mapper's own default. A component mapper with a default therefore shadows
//! the runtime-wide default mapper completely for that component.
//!
//! # Built-in Locator
//!
//! [`ErrorTypeLocator::builtin`] wires the well-known fault kinds to the
//! `CORE` types and falls back to `UNKNOWN`:
//!
//! | Fault kind | Error type |
//! |------------|------------|
//! | `FatalSignal` | `CORE:FATAL` |
//! | `GenericSevere` | `CORE:CRITICAL` |
//! | `ConnectivityFault` | `CORE:CONNECTIVITY` |
//! | `TransformationFault` | `CORE:TRANSFORMATION` |
//! | `ExpressionFault` | `CORE:EXPRESSION` |
//! | `ValidationFault` | `CORE:VALIDATION` |
//! | `RoutingFault` | `CORE:ROUTING` |
//! | `SecurityFault` | `CORE:SECURITY` |
//! | `TimeoutFault` | `CORE:TIMEOUT` |
//! | `RetryExhaustedFault` | `CORE:RETRY_EXHAUSTED` |
//! | `RedeliveryExhaustedFault` | `CORE:REDELIVERY_EXHAUSTED` |
//! | `DuplicateMessageFault` | `CORE:DUPLICATE_MESSAGE` |
//! | `StreamMaximumSizeExceededFault` | `CORE:STREAM_MAXIMUM_SIZE_EXCEEDED` |
//! | `OverloadFault` | `CORE:OVERLOAD` |
//!
//! # Example
//!
//! ```rust
//! use faultline::{ErrorTypeLocator, ErrorTypeRepository, ExceptionMapper, FaultKind};
//!
//! let mut builder = ErrorTypeRepository::builder();
//! let connectivity = builder.lookup("CORE", "CONNECTIVITY").unwrap();
//! let refused = builder.register("HTTP", "CONNECTION_REFUSED", Some(&connectivity)).unwrap();
//! let repo = builder.build();
//!
//! let locator = ErrorTypeLocator::builtin_builder(&repo)
//!     .add_component_mapper(
//!         "http:request",
//!         ExceptionMapper::builder()
//!             .add_mapping(FaultKind::CONNECTIVITY, refused.clone())
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(locator.classify("http:request", &FaultKind::CONNECTIVITY), &refused);
//! assert_eq!(locator.classify("db:select", &FaultKind::CONNECTIVITY), repo.connectivity());
//! assert_eq!(locator.classify("http:request", &FaultKind::TIMEOUT), repo.timeout());
//! ```

use crate::fault::FaultKind;
use crate::mapper::ExceptionMapper;
use crate::models::ComponentId;
use crate::repository::ErrorTypeRepository;
use crate::types::ErrorType;
use std::collections::HashMap;
use std::fmt;

/// Staging area for an [`ErrorTypeLocator`].
#[must_use = "builders do nothing until `build` is called"]
pub struct ErrorTypeLocatorBuilder {
    default_mapper: ExceptionMapper,
    component_mappers: HashMap<ComponentId, ExceptionMapper>,
    default_error_type: ErrorType,
    critical: ErrorType,
    fatal: ErrorType,
}

impl ErrorTypeLocatorBuilder {
    /// Override classification for one component. Replaces any mapper
    /// previously registered for the same component.
    pub fn add_component_mapper(
        mut self,
        component: impl Into<ComponentId>,
        mapper: ExceptionMapper,
    ) -> Self {
        self.component_mappers.insert(component.into(), mapper);
        self
    }

    /// Runtime-wide mapper consulted when no component mapper answers.
    pub fn default_mapper(mut self, mapper: ExceptionMapper) -> Self {
        self.default_mapper = mapper;
        self
    }

    /// Last-resort classification when no mapper answers.
    pub fn default_error_type(mut self, error_type: ErrorType) -> Self {
        self.default_error_type = error_type;
        self
    }

    /// Freeze the locator.
    pub fn build(self) -> ErrorTypeLocator {
        tracing::debug!(
            component_mappers = self.component_mappers.len(),
            default_mapper_entries = self.default_mapper.len(),
            default_error_type = %self.default_error_type,
            "error type locator built"
        );
        ErrorTypeLocator {
            default_mapper: self.default_mapper,
            component_mappers: self.component_mappers,
            default_error_type: self.default_error_type,
            critical: self.critical,
            fatal: self.fatal,
        }
    }
}

/// Answers "which error type does this component assign to this fault kind?".
///
/// Immutable after `build()`; share it freely between resolver threads.
pub struct ErrorTypeLocator {
    default_mapper: ExceptionMapper,
    component_mappers: HashMap<ComponentId, ExceptionMapper>,
    default_error_type: ErrorType,
    critical: ErrorType,
    fatal: ErrorType,
}

impl ErrorTypeLocator {
    /// Builder with an empty default mapper and `UNKNOWN` as default type.
    ///
    /// The repository's `CRITICAL` and `FATAL` types are captured for the
    /// resolver regardless of how mappers are configured.
    pub fn builder(repository: &ErrorTypeRepository) -> ErrorTypeLocatorBuilder {
        ErrorTypeLocatorBuilder {
            default_mapper: ExceptionMapper::empty(),
            component_mappers: HashMap::new(),
            default_error_type: repository.unknown().clone(),
            critical: repository.critical().clone(),
            fatal: repository.fatal().clone(),
        }
    }

    /// Builder pre-loaded with [`builtin_mapper`](Self::builtin_mapper).
    pub fn builtin_builder(repository: &ErrorTypeRepository) -> ErrorTypeLocatorBuilder {
        Self::builder(repository).default_mapper(Self::builtin_mapper(repository))
    }

    /// The runtime default locator: built-in mappings, `UNKNOWN` fallback.
    pub fn builtin(repository: &ErrorTypeRepository) -> Self {
        Self::builtin_builder(repository).build()
    }

    /// Default mapper wiring the well-known fault kinds to `CORE` types.
    pub fn builtin_mapper(repository: &ErrorTypeRepository) -> ExceptionMapper {
        ExceptionMapper::builder()
            .add_mapping(FaultKind::FatalSignal, repository.fatal().clone())
            .add_mapping(FaultKind::GenericSevere, repository.critical().clone())
            .add_mapping(FaultKind::CONNECTIVITY, repository.connectivity().clone())
            .add_mapping(FaultKind::TRANSFORMATION, repository.transformation().clone())
            .add_mapping(FaultKind::EXPRESSION, repository.expression().clone())
            .add_mapping(FaultKind::VALIDATION, repository.validation().clone())
            .add_mapping(FaultKind::ROUTING, repository.routing().clone())
            .add_mapping(FaultKind::SECURITY, repository.security().clone())
            .add_mapping(FaultKind::TIMEOUT, repository.timeout().clone())
            .add_mapping(FaultKind::RETRY_EXHAUSTED, repository.retry_exhausted().clone())
            .add_mapping(
                FaultKind::REDELIVERY_EXHAUSTED,
                repository.redelivery_exhausted().clone(),
            )
            .add_mapping(
                FaultKind::DUPLICATE_MESSAGE,
                repository.duplicate_message().clone(),
            )
            .add_mapping(
                FaultKind::STREAM_MAXIMUM_SIZE_EXCEEDED,
                repository.stream_maximum_size_exceeded().clone(),
            )
            .add_mapping(FaultKind::OVERLOAD, repository.overload().clone())
            .default_error_type(repository.unknown().clone())
            .build()
    }

    /// Classify `kind` as raised by `component`.
    pub fn classify(&self, component: &str, kind: &FaultKind) -> &ErrorType {
        self.component_mappers
            .get(component)
            .and_then(|mapper| mapper.map(kind))
            .or_else(|| self.default_mapper.map(kind))
            .unwrap_or(&self.default_error_type)
    }

    /// Classify `kind` without a component: default mapper, then default type.
    pub fn lookup_error_type(&self, kind: &FaultKind) -> &ErrorType {
        self.default_mapper
            .map(kind)
            .unwrap_or(&self.default_error_type)
    }

    /// Mapper registered for `component`, if any.
    #[inline]
    pub fn component_mapper(&self, component: &str) -> Option<&ExceptionMapper> {
        self.component_mappers.get(component)
    }

    /// The runtime-wide mapper.
    #[inline]
    pub fn default_mapper(&self) -> &ExceptionMapper {
        &self.default_mapper
    }

    /// Last-resort classification.
    #[inline]
    pub fn default_error_type(&self) -> &ErrorType {
        &self.default_error_type
    }

    /// Classification used for chains of generic severe faults.
    #[inline]
    pub fn critical_error_type(&self) -> &ErrorType {
        &self.critical
    }

    /// Classification used for the fatal signal.
    #[inline]
    pub fn fatal_error_type(&self) -> &ErrorType {
        &self.fatal
    }
}

impl fmt::Debug for ErrorTypeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components: Vec<&str> = self.component_mappers.keys().map(ComponentId::as_str).collect();
        components.sort_unstable();
        f.debug_struct("ErrorTypeLocator")
            .field("components", &components)
            .field("default_mapper", &self.default_mapper)
            .field("default_error_type", &self.default_error_type)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
