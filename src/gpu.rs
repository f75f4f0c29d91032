//! GPU boundary and its software implementation.

pub mod backend;
pub mod software;
