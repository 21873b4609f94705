//! `PCollection` transforms, grouped by the shape of the collection they apply to.

pub(crate) mod common;
pub(crate) mod keyed;
pub(crate) mod stdlib;
pub(crate) mod values;

// source constructors are free functions
pub use stdlib::*;
