//! Exception mappers - fault kind to error type tables.
//!
//! A mapper is an ordered table of `(FaultKind -> ErrorType)` entries plus an
//! optional default. Tables are small (a component rarely remaps more than a
//! handful of kinds), so entries live inline in a `SmallVec` and lookups are a
//! linear scan with no hashing.
//!
//! # Builder Semantics
//!
//! - `add_mapping` for a kind already present overwrites the earlier value
//!   (last write wins) but keeps the entry's original position
//! - `default_error_type` sets the fallback returned for unmapped kinds
//! - `build` takes an immutable snapshot
//!
//! # Example
//!
//! ```rust
//! use faultline::{ExceptionMapper, FaultKind, ErrorTypeRepository};
//!
//! let repo = ErrorTypeRepository::builder().build();
//! let mapper = ExceptionMapper::builder()
//!     .add_mapping(FaultKind::CONNECTIVITY, repo.connectivity().clone())
//!     .default_error_type(repo.unknown().clone())
//!     .build();
//!
//! assert_eq!(mapper.map(&FaultKind::CONNECTIVITY), Some(repo.connectivity()));
//! assert_eq!(mapper.map(&FaultKind::TIMEOUT), Some(repo.unknown()));
//! ```

use crate::fault::FaultKind;
use crate::types::ErrorType;
use smallvec::SmallVec;
use std::sync::Arc;

type Entries = SmallVec<[(FaultKind, ErrorType); 8]>;

/// Staging area for an [`ExceptionMapper`].
#[derive(Default)]
#[must_use = "builders do nothing until `build` is called"]
pub struct ExceptionMapperBuilder {
    entries: Entries,
    default: Option<ErrorType>,
}

impl ExceptionMapperBuilder {
    /// Map `kind` to `error_type`, overwriting any earlier mapping for `kind`.
    pub fn add_mapping(mut self, kind: FaultKind, error_type: ErrorType) -> Self {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => *existing = error_type,
            None => self.entries.push((kind, error_type)),
        }
        self
    }

    /// Fallback for kinds without an explicit mapping.
    pub fn default_error_type(mut self, error_type: ErrorType) -> Self {
        self.default = Some(error_type);
        self
    }

    /// Take an immutable snapshot.
    pub fn build(self) -> ExceptionMapper {
        ExceptionMapper {
            table: Arc::new(MapperTable {
                entries: self.entries,
                default: self.default,
            }),
        }
    }
}

struct MapperTable {
    entries: Entries,
    default: Option<ErrorType>,
}

/// Immutable fault kind to error type table.
///
/// Cloning shares the underlying table, so several locators can reuse one
/// default mapper.
#[derive(Clone)]
pub struct ExceptionMapper {
    table: Arc<MapperTable>,
}

impl ExceptionMapper {
    /// Start an empty builder.
    #[inline]
    pub fn builder() -> ExceptionMapperBuilder {
        ExceptionMapperBuilder::default()
    }

    /// A mapper with no entries and no default; `map` always returns `None`.
    #[inline]
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Explicit mapping for `kind`, else this mapper's default, else `None`.
    #[inline]
    pub fn map(&self, kind: &FaultKind) -> Option<&ErrorType> {
        self.get(kind).or(self.table.default.as_ref())
    }

    /// Explicit mapping only, ignoring the default.
    pub fn get(&self, kind: &FaultKind) -> Option<&ErrorType> {
        self.table
            .entries
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, error_type)| error_type)
    }

    /// The fallback for unmapped kinds.
    #[inline]
    pub fn default_error_type(&self) -> Option<&ErrorType> {
        self.table.default.as_ref()
    }

    /// Explicit entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&FaultKind, &ErrorType)> {
        self.table.entries.iter().map(|(k, t)| (k, t))
    }

    /// Number of explicit entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    /// Whether there are no explicit entries (a default may still be set).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }
}

impl Default for ExceptionMapper {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for ExceptionMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionMapper")
            .field(
                "entries",
                &self
                    .iter()
                    .map(|(k, t)| (k.name(), t.to_string()))
                    .collect::<Vec<_>>(),
            )
            .field("default", &self.table.default.as_ref().map(ToString::to_string))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::builtin_repository;

    #[test]
    fn explicit_mapping_wins_over_default() {
        let repo = builtin_repository();
        let mapper = ExceptionMapper::builder()
            .add_mapping(FaultKind::TIMEOUT, repo.timeout().clone())
            .default_error_type(repo.unknown().clone())
            .build();

        assert_eq!(mapper.map(&FaultKind::TIMEOUT), Some(repo.timeout()));
        assert_eq!(mapper.map(&FaultKind::ROUTING), Some(repo.unknown()));
        assert_eq!(mapper.get(&FaultKind::ROUTING), None);
    }

    #[test]
    fn no_default_yields_none() {
        let mapper = ExceptionMapper::empty();
        assert_eq!(mapper.map(&FaultKind::GenericSevere), None);
        assert!(mapper.is_empty());
        assert!(mapper.default_error_type().is_none());
    }

    #[test]
    fn last_write_wins_and_keeps_position() {
        let repo = builtin_repository();
        let mapper = ExceptionMapper::builder()
            .add_mapping(FaultKind::CONNECTIVITY, repo.connectivity().clone())
            .add_mapping(FaultKind::TIMEOUT, repo.timeout().clone())
            .add_mapping(FaultKind::CONNECTIVITY, repo.overload().clone())
            .build();

        assert_eq!(mapper.len(), 2);
        assert_eq!(mapper.map(&FaultKind::CONNECTIVITY), Some(repo.overload()));
        let order: Vec<&FaultKind> = mapper.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec![&FaultKind::CONNECTIVITY, &FaultKind::TIMEOUT]);
    }

    #[test]
    fn reordering_writes_changes_winner() {
        let repo = builtin_repository();
        let a = ExceptionMapper::builder()
            .add_mapping(FaultKind::PLAIN, repo.expression().clone())
            .add_mapping(FaultKind::PLAIN, repo.validation().clone())
            .build();
        let b = ExceptionMapper::builder()
            .add_mapping(FaultKind::PLAIN, repo.validation().clone())
            .add_mapping(FaultKind::PLAIN, repo.expression().clone())
            .build();

        assert_eq!(a.map(&FaultKind::PLAIN), Some(repo.validation()));
        assert_eq!(b.map(&FaultKind::PLAIN), Some(repo.expression()));
    }

    #[test]
    fn clones_share_the_table() {
        let mapper = ExceptionMapper::builder()
            .add_mapping(FaultKind::PLAIN, builtin_repository().any().clone())
            .build();
        let copy = mapper.clone();
        assert!(Arc::ptr_eq(&mapper.table, &copy.table));
    }

    #[test]
    fn domain_kinds_built_at_runtime_match_constants() {
        let repo = builtin_repository();
        let mapper = ExceptionMapper::builder()
            .add_mapping(FaultKind::domain(String::from("HttpFault")), repo.connectivity().clone())
            .build();
        assert_eq!(
            mapper.map(&FaultKind::domain("HttpFault")),
            Some(repo.connectivity())
        );
    }
}
