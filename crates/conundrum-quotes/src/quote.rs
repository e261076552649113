//! `Quote` trait and `SimpleQuote` implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use conundrum_core::{
    errors::{Error, Result},
    Observable, Real, VersionCounter,
};

/// A market-observable value.
pub trait Quote: Observable + std::fmt::Debug + Send + Sync {
    /// Return the current value, `None` if the quote is not set.
    fn value(&self) -> Option<Real>;

    /// Return `true` if the quote is currently valid.
    fn is_valid(&self) -> bool {
        self.value().is_some()
    }

    /// The current value, or [`Error::NullValue`] if the quote is not set.
    fn checked_value(&self) -> Result<Real> {
        self.value()
            .ok_or_else(|| Error::NullValue(format!("quote {self:?} has no value")))
    }
}

const EMPTY: u64 = u64::MAX;

/// A mutable market quote shared through `Arc`.
///
/// Setting the value bumps the quote's version.
#[derive(Debug)]
pub struct SimpleQuote {
    bits: AtomicU64,
    version: VersionCounter,
}

impl SimpleQuote {
    /// Create a new quote with the given value.
    pub fn new(value: Real) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
            version: VersionCounter::new(),
        }
    }

    /// Create an empty (invalid) quote.
    pub fn empty() -> Self {
        Self {
            bits: AtomicU64::new(EMPTY),
            version: VersionCounter::new(),
        }
    }

    /// Shared quote, ready to be put in a handle.
    pub fn shared(value: Real) -> Arc<Self> {
        Arc::new(Self::new(value))
    }

    /// Set a new value; returns the previous one.
    ///
    /// The version is only bumped when the value actually changes.
    pub fn set_value(&self, value: Real) -> Option<Real> {
        let old = self.bits.swap(value.to_bits(), Ordering::AcqRel);
        if old != value.to_bits() {
            self.version.bump();
        }
        (old != EMPTY).then(|| Real::from_bits(old))
    }

    /// Clear the value, making the quote invalid.
    pub fn reset(&self) {
        if self.bits.swap(EMPTY, Ordering::AcqRel) != EMPTY {
            self.version.bump();
        }
    }
}

impl Observable for SimpleQuote {
    fn version(&self) -> u64 {
        self.version.current()
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Option<Real> {
        let bits = self.bits.load(Ordering::Acquire);
        (bits != EMPTY).then(|| Real::from_bits(bits))
    }
}

/// The negative of another quote; shares its version.
#[derive(Debug)]
pub struct NegativeQuote<Q: Quote> {
    inner: Arc<Q>,
}

impl<Q: Quote> NegativeQuote<Q> {
    /// Wrap a quote, negating its value.
    pub fn new(inner: Arc<Q>) -> Self {
        Self { inner }
    }
}

impl<Q: Quote> Observable for NegativeQuote<Q> {
    fn version(&self) -> u64 {
        self.inner.version()
    }
}

impl<Q: Quote> Quote for NegativeQuote<Q> {
    fn value(&self) -> Option<Real> {
        self.inner.value().map(|v| -v)
    }
}
