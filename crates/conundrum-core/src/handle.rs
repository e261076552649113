//! `Handle<T>`: a shared, optionally empty reference to market data.
//!
//! Pricers hold their curves, volatility structures and quotes through
//! handles so that the same object can be shared by every coupon of a leg.
//! Emptiness is checked when a pricing context is built, never by panicking.

use std::sync::Arc;

use crate::errors::{Error, Result};

/// A shared, optionally-null reference to a value of type `T`.
///
/// `T` may be unsized so that trait objects (`Handle<dyn YieldTermStructure>`)
/// can be stored directly.
pub struct Handle<T: ?Sized> {
    inner: Option<Arc<T>>,
}

impl<T> Handle<T> {
    /// Create a non-null handle wrapping `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Some(Arc::new(value)),
        }
    }
}

impl<T: ?Sized> Handle<T> {
    /// Create a handle from an existing `Arc`.
    pub fn from_arc(arc: Arc<T>) -> Self {
        Self { inner: Some(arc) }
    }

    /// Create a null (empty) handle.
    pub fn null() -> Self {
        Self { inner: None }
    }

    /// Return `true` if the handle is null (contains no value).
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Attempt to borrow the contained value.
    pub fn get(&self) -> Option<&T> {
        self.inner.as_deref()
    }

    /// Return the shared pointer, or [`Error::NullValue`] naming `what`.
    pub fn link(&self, what: &str) -> Result<&Arc<T>> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::NullValue(format!("empty {what} handle")))
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> Default for Handle<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> From<Arc<T>> for Handle<T> {
    fn from(arc: Arc<T>) -> Self {
        Self::from_arc(arc)
    }
}

impl<T: ?Sized> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Some(_) => write!(f, "Handle(linked)"),
            None => write!(f, "Handle(null)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> &str;
    }

    struct Curve;

    impl Named for Curve {
        fn name(&self) -> &str {
            "curve"
        }
    }

    #[test]
    fn trait_object_handle() {
        let h: Handle<dyn Named> = Handle::from_arc(Arc::new(Curve));
        assert!(!h.is_empty());
        assert_eq!(h.link("discount curve").map(|c| c.name()), Ok("curve"));
    }

    #[test]
    fn empty_handle_reports_what_is_missing() {
        let h: Handle<dyn Named> = Handle::null();
        assert!(h.get().is_none());
        match h.link("swaption volatility") {
            Err(Error::NullValue(msg)) => assert!(msg.contains("swaption volatility")),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }
}
