//! Change tracking: an explicit dependency graph of version counters and
//! the version-stamped cache built on top of it.

pub mod lazy_object;
pub mod observable;
