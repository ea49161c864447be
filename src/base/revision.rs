//! Generation counters used to invalidate cached query results.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of an index's mutation state.
///
/// `source` advances on every change, `library` only when dependency code
/// changes. Caches derived from library code compare `library` alone; all
/// other caches compare the whole revision.
///
/// Ordering is by `source`, then `library`. Every bump advances `source`,
/// so a later revision of one index always compares greater.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision {
    pub source: u64,
    pub library: u64,
}

impl Revision {
    pub const fn new(source: u64, library: u64) -> Self {
        Self { source, library }
    }

    /// Projection used as cache stamp for results derived only from
    /// library code. Source edits do not change it.
    pub const fn library_only(self) -> Self {
        Self {
            source: 0,
            library: self.library,
        }
    }
}

/// Thread-safe pair of monotonically increasing counters.
#[derive(Debug, Default)]
pub struct Generation {
    source: AtomicU64,
    library: AtomicU64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current revision.
    pub fn current(&self) -> Revision {
        Revision {
            source: self.source.load(Ordering::Acquire),
            library: self.library.load(Ordering::Acquire),
        }
    }

    /// Record a project source change.
    pub fn bump_source(&self) -> Revision {
        self.source.fetch_add(1, Ordering::AcqRel);
        self.current()
    }

    /// Record a library/dependency change. Source-derived results depend on
    /// libraries too, so both counters advance.
    pub fn bump_library(&self) -> Revision {
        self.library.fetch_add(1, Ordering::AcqRel);
        self.bump_source()
    }
}
