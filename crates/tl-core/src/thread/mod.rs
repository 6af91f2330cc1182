//! Thread reconstruction
//!
//! Turns the flat, time-ordered comment list of a post into a reply tree.

pub mod builder;
pub mod index;
pub mod tree;

pub use builder::{OrphanPolicy, ThreadBuilder};
pub use index::ChildIndex;
pub use tree::{Thread, ThreadNode};
