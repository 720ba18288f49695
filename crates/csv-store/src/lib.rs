//! Flat-file persistence for every stage hand-off. The on-disk schemas are
//! the compatibility contract between stages, so each writer has a matching
//! reader and stages stay independently invocable over the same directories.

pub mod conjunction;
pub mod excess;
pub mod paths;
pub mod weekly;
