//! Resumable labeled dataset construction.

pub mod builder;
pub mod labels;
pub mod table;
