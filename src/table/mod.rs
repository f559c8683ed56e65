//! The flat rule table: layout, storage, builder and position scan.
//!
//! The whole rule set lives in one contiguous little-endian buffer, so it
//! can be snapshotted, memory-mapped or handed to a foreign linear memory
//! as a single opaque blob.
//!
//! # Buffer layout
//!
//! ```text
//! +--------------------+
//! |      SCRATCH       |  512 bytes (fixed)
//! |  hostname  [0,256) |
//! |  label idx [256,..)|
//! |  ptr slots, flag   |
//! +--------------------+
//! |     TREE REGION    |  12-byte node records
//! +--------------------+
//! |   CHARACTER DATA   |  labels longer than 4 bytes, deduplicated
//! +--------------------+
//! ```

pub(crate) mod builder;
pub mod buffer;
pub mod format;
pub(crate) mod matcher;


pub use buffer::TableBuffer;
