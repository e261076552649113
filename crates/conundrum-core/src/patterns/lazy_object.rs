//! Version-stamped result cache.
//!
//! A [`VersionedCache`] keeps the last computed value together with the
//! dependency version it was computed at.  Reading it with a newer version
//! recomputes; reading with the same version returns the stored value.
//! Interior mutability (`Cell`) lets the cache be refreshed through `&self`.

use std::cell::Cell;

use crate::errors::Result;

/// Single-slot cache keyed by a dependency version.
pub struct VersionedCache<T: Copy> {
    slot: Cell<Option<(u64, T)>>,
}

impl<T: Copy> VersionedCache<T> {
    /// An empty cache.
    pub fn new() -> Self {
        Self {
            slot: Cell::new(None),
        }
    }

    /// Return the cached value if it was computed at `version`, otherwise
    /// run `compute`, store its result and return it.  Errors are not cached.
    pub fn get_or_try_update<F>(&self, version: u64, compute: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some((v, value)) = self.slot.get() {
            if v == version {
                return Ok(value);
            }
        }
        let value = compute()?;
        self.slot.set(Some((version, value)));
        Ok(value)
    }

    /// `true` if a value computed at `version` is stored.
    pub fn is_fresh(&self, version: u64) -> bool {
        matches!(self.slot.get(), Some((v, _)) if v == version)
    }

    /// Drop the stored value.
    pub fn invalidate(&self) {
        self.slot.set(None);
    }
}

impl<T: Copy> Default for VersionedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Clone for VersionedCache<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Cell::new(self.slot.get()),
        }
    }
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for VersionedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedCache")
            .field("slot", &self.slot.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn recomputes_only_on_version_change() {
        let cache = VersionedCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(0.03)
        };
        assert_eq!(cache.get_or_try_update(1, compute), Ok(0.03));
        assert_eq!(cache.get_or_try_update(1, compute), Ok(0.03));
        assert_eq!(calls.get(), 1);
        assert!(cache.is_fresh(1));
        assert_eq!(cache.get_or_try_update(2, compute), Ok(0.03));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: VersionedCache<f64> = VersionedCache::new();
        let r = cache.get_or_try_update(1, || Err(Error::Runtime("no".into())));
        assert!(r.is_err());
        assert!(!cache.is_fresh(1));
        assert_eq!(cache.get_or_try_update(1, || Ok(1.0)), Ok(1.0));
    }

    #[test]
    fn invalidate_forces_recompute() {
        let cache = VersionedCache::new();
        cache.get_or_try_update(7, || Ok(1.0)).unwrap();
        cache.invalidate();
        assert_eq!(cache.get_or_try_update(7, || Ok(2.0)), Ok(2.0));
    }
}
