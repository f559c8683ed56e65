//! Hostname preparation and the position scan.
//!
//! The scan walks the rule tree and the label-index table in lock-step,
//! one hostname label per level, binary-searching each node's sorted
//! children. It reads raw buffer bytes throughout and allocates nothing;
//! the only write is the wildcard-fallback flag byte in the scratch.

use std::cmp::Ordering;

use super::buffer::TableBuffer;
use super::format::{
    node_child_count, node_flags, node_label_len, NodeFlags, CHARDATA_PTR_SLOT, HOSTNAME_MAX_LEN,
    HOSTNAME_SLOT, INLINE_LABEL_MAX, LABEL_INDICES_SLOT, NODE_WORDS, RULES_PTR_SLOT, SCRATCH_SIZE,
    SUFFIX_NOT_FOUND_SLOT,
};

/// Copy `hostname` into the scratch region, lowercased and clamped to 255
/// bytes, and rebuild the label-index table. Returns the clamped length.
///
/// The table is built right to left: each dot emits an `(end, begin)` pair,
/// so the first entry points at the rightmost label (the TLD), matching the
/// tree's orientation. Pair emission stops short of the pointer slots; a
/// hostname that deep has long since stopped matching any rule.
pub fn prepare(buf: &mut TableBuffer, hostname: &str) -> usize {
    if buf.len() < SCRATCH_SIZE {
        return 0;
    }
    let bytes = buf.bytes_mut();
    if hostname.is_empty() {
        bytes[LABEL_INDICES_SLOT] = 0;
        return 0;
    }
    let src = hostname.as_bytes();
    let n = src.len().min(HOSTNAME_MAX_LEN);
    bytes[LABEL_INDICES_SLOT] = n as u8;
    let mut j = LABEL_INDICES_SLOT + 1;
    let mut i = n;
    while i > 0 {
        i -= 1;
        let c = src[i].to_ascii_lowercase();
        bytes[HOSTNAME_SLOT + i] = c;
        if c == b'.' && j < SUFFIX_NOT_FOUND_SLOT - 2 {
            bytes[j] = (i + 1) as u8;
            bytes[j + 1] = i as u8;
            j += 2;
        }
    }
    bytes[j] = 0;
    n
}

/// Walk the rule tree against the prepared label-index table.
///
/// Returns the byte offset within the label-index table of the entry where
/// the longest matched rule starts, or -1 when no rule matched. Precedence
/// follows the PSL algorithm: an exception beats everything and truncates
/// one label, otherwise the deepest terminus wins, with `*` as the
/// per-level fallback.
pub fn public_suffix_position(buf: &mut TableBuffer) -> i32 {
    let words_len = buf.len() / 4;
    if words_len <= SCRATCH_SIZE / 4 {
        return -1;
    }
    let chardata = buf.word(CHARDATA_PTR_SLOT) as usize;
    let mut inode = buf.word(RULES_PTR_SLOT) as usize;
    if inode == 0 {
        return -1;
    }
    let mut cursor: i32 = -1;
    let mut ilabel = LABEL_INDICES_SLOT;

    loop {
        let label_end = buf.byte(ilabel) as usize;
        let label_beg = buf.byte(ilabel + 1) as usize;
        let label_len = label_end.saturating_sub(label_beg);

        if inode + NODE_WORDS > words_len {
            break;
        }
        let child_count = node_child_count(buf.word(inode));
        if child_count == 0 {
            break;
        }
        let children = buf.word(inode + 2) as usize;

        let mut found = 0usize;
        let mut lo = 0usize;
        let mut hi = child_count;
        while lo < hi {
            let mid = (lo + hi) >> 1;
            let cand = children + mid * NODE_WORDS;
            if cand + NODE_WORDS > words_len {
                return cursor;
            }
            match compare_label(buf, cand, chardata, label_beg, label_len) {
                Ordering::Less => hi = mid,
                Ordering::Greater => lo = mid + 1,
                Ordering::Equal => {
                    found = cand;
                    break;
                }
            }
        }

        // PSL step 2: if no rule matches, the prevailing rule is "*".
        if found == 0 {
            let first = children;
            if first + NODE_WORDS > words_len {
                break;
            }
            if node_label_len(buf.word(first)) != 1 || buf.byte((first + 1) * 4) != b'*' {
                break;
            }
            buf.set_byte(SUFFIX_NOT_FOUND_SLOT, 1);
            found = first;
        }

        inode = found;
        let flags = node_flags(buf.word(inode));

        // PSL step 5: an exception rule wins outright; the suffix starts
        // one label to the right of it.
        if flags.contains(NodeFlags::EXCEPTION) {
            cursor = if ilabel > LABEL_INDICES_SLOT {
                (ilabel - 2) as i32
            } else {
                -1
            };
            break;
        }
        // PSL step 4: the longest matching rule prevails, so keep walking
        // after recording this terminus.
        if flags.contains(NodeFlags::RULE_TERMINUS) {
            cursor = ilabel as i32;
        }
        if label_beg == 0 {
            break;
        }
        ilabel += 2;
    }

    cursor
}

/// Length-major comparison of the scratch label against a node's stored
/// label. Labels up to four bytes live inline in the node's second word;
/// longer ones are read from the character-data region.
#[inline]
fn compare_label(
    buf: &TableBuffer,
    cand: usize,
    chardata: usize,
    label_beg: usize,
    label_len: usize,
) -> Ordering {
    let cand_len = node_label_len(buf.word(cand));
    match label_len.cmp(&cand_len) {
        Ordering::Equal => {}
        unequal => return unequal,
    }
    let cand_at = if cand_len <= INLINE_LABEL_MAX {
        (cand + 1) * 4
    } else {
        chardata + buf.word(cand + 1) as usize
    };
    let bytes = buf.bytes();
    if cand_at + cand_len > bytes.len() {
        return Ordering::Less;
    }
    bytes[label_beg..label_beg + label_len].cmp(&bytes[cand_at..cand_at + cand_len])
}

/// Count rule terminus nodes by walking the serialized tree. Used to
/// rebuild statistics after a snapshot restore.
pub fn count_rules(buf: &TableBuffer) -> usize {
    let words_len = buf.len() / 4;
    if words_len <= SCRATCH_SIZE / 4 {
        return 0;
    }
    let root = buf.word(RULES_PTR_SLOT) as usize;
    if root == 0 {
        return 0;
    }
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(inode) = stack.pop() {
        if inode + NODE_WORDS > words_len {
            continue;
        }
        let word0 = buf.word(inode);
        if node_flags(word0).contains(NodeFlags::RULE_TERMINUS) {
            count += 1;
        }
        let children = buf.word(inode + 2) as usize;
        for i in 0..node_child_count(word0) {
            stack.push(children + i * NODE_WORDS);
        }
    }
    count
}
