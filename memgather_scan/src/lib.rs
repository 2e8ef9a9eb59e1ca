//! Offset-addressable content search over byte resources.
//!
//! Resources are read through a sliding window so they never have to be fully loaded,
//! cursors over that window feed the byte stream scanner used for literal searches.

pub mod source;
pub mod cursor;

pub mod candidate;
pub mod predicate;
pub mod stream;

pub mod search;
pub mod find;

pub mod prelude;
