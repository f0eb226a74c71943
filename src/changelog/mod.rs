//! Changelog assembly and writing.

pub mod format;
pub mod writer;

pub use format::{Changelog, EntryOrder, Summary};
pub use writer::{Destination, write_changelog};
