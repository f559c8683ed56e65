//! psltab - Public Suffix List matching over a flat, relocatable table.
//!
//! This crate answers one question fast: given a DNS hostname, what is its
//! *public suffix* (the longest trailing run of labels matching a rule of
//! the [Public Suffix List](https://publicsuffix.org/)) and its
//! *registrable domain* (that suffix plus one label)? It is meant to be
//! embedded in tools that classify thousands of hostnames per second.
//!
//! # Design
//!
//! - **Flat table**: the ~10,000 PSL rules compile into a trie flattened
//!   into a single contiguous byte buffer of fixed-size node records with
//!   32-bit offsets. The buffer is position-independent: it can be
//!   persisted, memory-mapped or moved across an FFI boundary and used
//!   as-is.
//! - **Allocation-free lookups**: a query lowercases the hostname into a
//!   reserved scratch prefix of the buffer, then walks the trie label by
//!   label, right to left, binary-searching each node's sorted children.
//!   PSL precedence (exception beats longest match beats wildcard) is
//!   honored in a single pass.
//! - **Snapshots**: the buffer round-trips through [`Selfie`] records or
//!   codec-wrapped strings, and restores are immediately usable.
//! - **Swappable backend**: the position scan behind lookups can be
//!   replaced at runtime by a [`SuffixAccelerator`], with transparent
//!   fallback to the reference implementation.
//!
//! # Quick start
//!
//! ```
//! use psltab::PublicSuffixList;
//!
//! let mut psl = PublicSuffixList::new();
//! // Feed the PSL text; the converter handles internationalized lines
//! // (use the idna crate, or pass through if the list is all-ASCII).
//! psl.parse("com\nco.uk\n*.jp\n", |line| line.to_string());
//!
//! assert_eq!(psl.public_suffix("www.example.com"), "com");
//! assert_eq!(psl.registrable_domain("www.example.com"), "example.com");
//! assert!(!psl.is_public_suffix("example.com"));
//! ```

mod accel;
mod error;
mod list;
mod selfie;
mod table;

pub use accel::{reference_position, AcceleratorLoader, SuffixAccelerator};
pub use error::{Error, Result};
pub use list::PublicSuffixList;
pub use selfie::{Selfie, SelfieCodec};
pub use table::format::{NodeFlags, SELFIE_MAGIC};
pub use table::TableBuffer;
