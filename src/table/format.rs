//! Flat table layout constants and helpers.
//!
//! All multi-byte values are little-endian.

use bitflags::bitflags;
use std::cmp::Ordering;

/// Size of the scratch region in bytes.
pub const SCRATCH_SIZE: usize = 512;

/// Byte offset of the hostname scratch storage (256 bytes).
pub const HOSTNAME_SLOT: usize = 0;

/// Byte offset of the label-index table. The byte at this offset holds the
/// prepared hostname's length; `(end, begin)` pairs follow, terminated by a
/// zero begin.
pub const LABEL_INDICES_SLOT: usize = 256;

/// Word offset of the root node pointer (a word offset into the buffer).
pub const RULES_PTR_SLOT: usize = 100;

/// Word offset of the character-data pointer (a byte offset into the buffer).
pub const CHARDATA_PTR_SLOT: usize = 101;

/// Byte offset of the wildcard-fallback flag, set by the position scan when
/// the terminal match came from a `*` fallback rather than an explicit rule.
pub const SUFFIX_NOT_FOUND_SLOT: usize = 399;

/// Word offset of the first node record; the tree region starts right after
/// the scratch.
pub const TREE_BASE_WORD: usize = SCRATCH_SIZE / 4;

/// Words per node record.
pub const NODE_WORDS: usize = 3;

/// Longest label packed inline into a node's second word.
pub const INLINE_LABEL_MAX: usize = 4;

/// Longest accepted rule line (RFC 1035 hostname cap).
pub const RULE_MAX_LEN: usize = 253;

/// Longest hostname the scratch can hold.
pub const HOSTNAME_MAX_LEN: usize = 255;

/// Snapshot magic. Any change to the node layout or the scratch slots must
/// bump this.
pub const SELFIE_MAGIC: u32 = 2;

bitflags! {
    /// Per-node flags, stored in bits 8..16 of a node's first word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// The path from the root to this node spells out a rule.
        const RULE_TERMINUS = 0x01;
        /// That rule is an exception (`!`-prefixed in the source list).
        const EXCEPTION = 0x02;
    }
}

/// Pack a node's first word from its label length, flags and child count.
#[inline]
pub fn pack_node_word(label_len: usize, flags: NodeFlags, child_count: usize) -> u32 {
    label_len as u32 | (flags.bits() as u32) << 8 | (child_count as u32) << 16
}

/// Label length stored in a node's first word.
#[inline]
pub fn node_label_len(word0: u32) -> usize {
    (word0 & 0xFF) as usize
}

/// Flags stored in a node's first word.
#[inline]
pub fn node_flags(word0: u32) -> NodeFlags {
    NodeFlags::from_bits_truncate((word0 >> 8) as u8)
}

/// Child count stored in a node's first word.
#[inline]
pub fn node_child_count(word0: u32) -> usize {
    (word0 >> 16) as usize
}

/// Length-major label ordering: shorter labels sort first, ties break
/// bytewise. Lets the position scan reject a candidate on length alone
/// before touching its bytes.
#[inline]
pub fn compare_labels(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
