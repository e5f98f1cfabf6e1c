//! Low-level format plumbing shared by the readers.

pub(crate) mod text;
pub(crate) mod xml;
pub(crate) mod zip;
