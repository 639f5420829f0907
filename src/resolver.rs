//! The resolution engine - one classification and one message per fault.
//!
//! # Algorithm
//!
//! The causal chain is walked outermost first. The first matching rule wins:
//!
//! 1. **Fatal signal**: the first `FatalSignal` fault anywhere in the chain
//!    classifies as `FATAL`. Faults below it are not inspected.
//! 2. **Severe chain**: two or more `GenericSevere` faults at the top of the
//!    chain classify as `CRITICAL`. The innermost fault of that run is used.
//! 3. **Existing**: an event that already carries an `Error` keeps it, and the
//!    base message is returned verbatim.
//! 4. **Single severe**: exactly one `GenericSevere` on top classifies as
//!    `CRITICAL` with the outermost fault.
//! 5. **Located**: the locator classifies the outermost fault's kind for the
//!    raising component.
//!
//! Rules 1 and 2 override a classification attached by an earlier stage;
//! rules 4 and 5 never run when one is present.
//!
//! # Rendering
//!
//! When the used fault carries a non-empty message the resolved message is
//! `"{message} ({kind name})."`. Otherwise the base message is kept.
//!
//! # Bounded Traversal
//!
//! At most [`ResolverConfig::max_chain_depth`] links are inspected. A fatal
//! signal below the bound is not seen; hitting the bound is logged at `warn`
//! level.
//!
//! # Example
//!
//! ```rust
//! use faultline::{definitions, resolve, ErrorTypeLocator, Event, EventErrors, Fault, MessagingFault};
//!
//! let repo = definitions::builtin_repository();
//! let locator = ErrorTypeLocator::builtin(repo);
//!
//! let mf = MessagingFault::new("Messaging Error Message", Fault::severe("AN ERROR"), Event::new("e-1"), "core:logger");
//! let resolved = resolve(mf, &locator);
//!
//! assert_eq!(resolved.message(), "AN ERROR (SevereFault).");
//! assert_eq!(resolved.event().error().unwrap().error_type(), repo.critical());
//! ```

use crate::fault::{Fault, DEFAULT_MAX_CHAIN_DEPTH};
use crate::locator::ErrorTypeLocator;
use crate::logging::ResolutionLog;
use crate::models::{ComponentId, Error, EventErrors, MessagingFault};
use crate::types::ErrorType;
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// Configuration
// ============================================================================

/// Runtime knobs for the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    max_chain_depth: usize,
}

impl ResolverConfig {
    /// Configuration with default values.
    #[inline]
    pub const fn new() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    /// Cap the number of chain links inspected. Zero is clamped to one.
    #[inline]
    pub const fn with_max_chain_depth(mut self, max_chain_depth: usize) -> Self {
        self.max_chain_depth = if max_chain_depth == 0 { 1 } else { max_chain_depth };
        self
    }

    /// Maximum number of chain links inspected.
    #[inline]
    pub const fn max_chain_depth(&self) -> usize {
        self.max_chain_depth
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionBranch {
    /// A fatal signal was found in the chain.
    FatalSignal,
    /// `depth >= 2` generic severe faults at the top of the chain.
    SevereChain {
        /// Length of the severe run.
        depth: usize,
    },
    /// The event's existing classification was kept.
    Existing,
    /// Exactly one generic severe fault on top and no existing classification.
    SingleSevere,
    /// Classified through the locator.
    Located,
}

impl ResolutionBranch {
    /// Stable snake_case name for logs and metrics labels.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FatalSignal => "fatal_signal",
            Self::SevereChain { .. } => "severe_chain",
            Self::Existing => "existing",
            Self::SingleSevere => "single_severe",
            Self::Located => "located",
        }
    }

    /// Whether the branch replaces a classification already on the event.
    #[inline]
    pub const fn overrides_existing(&self) -> bool {
        matches!(self, Self::FatalSignal | Self::SevereChain { .. })
    }
}

impl fmt::Display for ResolutionBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of classifying one causal chain.
///
/// Borrows the chain it was computed from; the error type is an owned handle.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    error_type: ErrorType,
    branch: ResolutionBranch,
    used_fault: Option<&'a Fault>,
    component: &'a ComponentId,
    severe_depth: usize,
    truncated: bool,
}

impl<'a> Resolution<'a> {
    /// The final classification.
    #[inline]
    pub fn error_type(&self) -> &ErrorType {
        &self.error_type
    }

    /// The rule that produced it.
    #[inline]
    pub fn branch(&self) -> ResolutionBranch {
        self.branch
    }

    /// The fault whose message and kind drive rendering. `None` when the
    /// existing classification was kept.
    #[inline]
    pub fn used_fault(&self) -> Option<&'a Fault> {
        self.used_fault
    }

    /// The component that raised the chain.
    #[inline]
    pub fn component(&self) -> &'a ComponentId {
        self.component
    }

    /// Length of the generic severe run at the top of the chain.
    #[inline]
    pub fn severe_depth(&self) -> usize {
        self.severe_depth
    }

    /// Whether the depth bound stopped traversal above the innermost fault.
    #[inline]
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Render the resolved message from `base`.
    pub fn render<'b>(&self, base: &'b str) -> Cow<'b, str> {
        match self.decorated() {
            Some(rendered) => Cow::Owned(rendered),
            None => Cow::Borrowed(base),
        }
    }

    /// The error to write onto the event, or `None` to keep the existing one.
    pub fn to_error(&self) -> Option<Error> {
        match self.branch {
            ResolutionBranch::Existing => None,
            _ => Some(Error::new(self.error_type.clone(), self.used_fault.cloned())),
        }
    }

    /// Borrowed structured record of this resolution.
    pub fn log(&self) -> ResolutionLog<'_> {
        ResolutionLog {
            component: self.component.as_str(),
            branch: self.branch,
            error_type: &self.error_type,
            fault_kind: self.used_fault.map(Fault::kind),
            fault_message: self.used_fault.and_then(Fault::message),
            severe_depth: self.severe_depth,
            truncated: self.truncated,
        }
    }

    fn decorated(&self) -> Option<String> {
        let fault = self.used_fault?;
        let message = fault.message().filter(|m| !m.is_empty())?;
        Some(format!("{} ({}).", message, fault.kind().name()))
    }

    fn render_owned(&self, base: Cow<'static, str>) -> Cow<'static, str> {
        match self.decorated() {
            Some(rendered) => Cow::Owned(rendered),
            None => base,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Classify a causal chain without touching any event.
///
/// `existing` is the classification currently attached to the event.
pub fn classify<'a>(
    root: &'a Fault,
    component: &'a ComponentId,
    existing: Option<&Error>,
    locator: &ErrorTypeLocator,
    config: &ResolverConfig,
) -> Resolution<'a> {
    let mut chain = root.chain_bounded(config.max_chain_depth());
    let mut fatal = None;
    let mut severe_depth = 0;
    let mut in_severe_run = true;
    let mut last_severe = root;

    for fault in chain.by_ref() {
        if fault.kind().is_fatal_signal() {
            fatal = Some(fault);
            break;
        }
        if in_severe_run && fault.kind().is_generic_severe() {
            severe_depth += 1;
            last_severe = fault;
        } else {
            in_severe_run = false;
        }
    }

    let truncated = fatal.is_none() && chain.truncated();
    if truncated {
        tracing::warn!(
            component = %component,
            max_chain_depth = config.max_chain_depth(),
            "fault chain exceeds depth bound, deeper faults not inspected"
        );
    }

    let (error_type, branch, used_fault) = if let Some(fault) = fatal {
        (
            locator.fatal_error_type().clone(),
            ResolutionBranch::FatalSignal,
            Some(fault),
        )
    } else if severe_depth >= 2 {
        (
            locator.critical_error_type().clone(),
            ResolutionBranch::SevereChain {
                depth: severe_depth,
            },
            Some(last_severe),
        )
    } else if let Some(existing) = existing {
        (existing.error_type().clone(), ResolutionBranch::Existing, None)
    } else if severe_depth == 1 {
        (
            locator.critical_error_type().clone(),
            ResolutionBranch::SingleSevere,
            Some(root),
        )
    } else {
        (
            locator.classify(component.as_str(), root.kind()).clone(),
            ResolutionBranch::Located,
            Some(root),
        )
    };

    Resolution {
        error_type,
        branch,
        used_fault,
        component,
        severe_depth,
        truncated,
    }
}

/// Resolve with the default [`ResolverConfig`].
#[inline]
pub fn resolve<E: EventErrors>(mf: MessagingFault<E>, locator: &ErrorTypeLocator) -> MessagingFault<E> {
    resolve_with(mf, locator, &ResolverConfig::default())
}

/// Resolve `mf`: write the final `Error` onto its event and return it with
/// the resolved message.
pub fn resolve_with<E: EventErrors>(
    mf: MessagingFault<E>,
    locator: &ErrorTypeLocator,
    config: &ResolverConfig,
) -> MessagingFault<E> {
    let (message, fault, mut event, component) = mf.into_parts();

    let message = {
        let resolution = classify(&fault, &component, event.error(), locator, config);
        tracing::debug!(
            component = %component,
            branch = %resolution.branch(),
            error_type = %resolution.error_type(),
            severe_depth = resolution.severe_depth(),
            "fault resolved"
        );

        if let Some(error) = resolution.to_error() {
            if let Some(previous) = event.error() {
                tracing::trace!(
                    previous = %previous.error_type(),
                    replacement = %error.error_type(),
                    "existing classification overridden"
                );
            }
            event.set_error(error);
        }

        resolution.render_owned(message)
    };

    MessagingFault::from_parts(message, fault, event, component)
}

/// A locator bundled with its configuration.
#[derive(Debug)]
pub struct MessagingFaultResolver {
    locator: ErrorTypeLocator,
    config: ResolverConfig,
}

impl MessagingFaultResolver {
    /// Resolver with the default configuration.
    pub fn new(locator: ErrorTypeLocator) -> Self {
        Self::with_config(locator, ResolverConfig::default())
    }

    /// Resolver with an explicit configuration.
    pub fn with_config(locator: ErrorTypeLocator, config: ResolverConfig) -> Self {
        Self { locator, config }
    }

    /// The locator used for rule 5.
    #[inline]
    pub fn locator(&self) -> &ErrorTypeLocator {
        &self.locator
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// See [`resolve_with`].
    pub fn resolve<E: EventErrors>(&self, mf: MessagingFault<E>) -> MessagingFault<E> {
        resolve_with(mf, &self.locator, &self.config)
    }

    /// Preview the resolution of `mf` without modifying its event.
    pub fn classify<'a, E: EventErrors>(&self, mf: &'a MessagingFault<E>) -> Resolution<'a> {
        classify(
            mf.fault(),
            mf.component(),
            mf.event().error(),
            &self.locator,
            &self.config,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
