//! Public Suffix List text parsing and table serialization.
//!
//! `parse_into` runs in two stages: the rule lines are first inserted into a
//! transient tree keyed by DNS label, walking each rule right-to-left (TLD
//! first), then the tree is flattened into the buffer's node layout. The
//! tree lives only for the duration of the call.

use std::collections::HashMap;

use super::buffer::TableBuffer;
use super::format::{
    compare_labels, pack_node_word, NodeFlags, CHARDATA_PTR_SLOT, INLINE_LABEL_MAX, NODE_WORDS,
    RULES_PTR_SLOT, RULE_MAX_LEN, SCRATCH_SIZE, TREE_BASE_WORD,
};

/// Transient rule-tree node.
struct TreeNode {
    label: Vec<u8>,
    flags: NodeFlags,
    /// Sorted under the length-major ordering; sibling labels are unique.
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(label: &[u8]) -> Self {
        Self {
            label: label.to_vec(),
            flags: NodeFlags::empty(),
            children: Vec::new(),
        }
    }
}

/// Insert one rule, walking its labels right-to-left.
fn insert_rule(root: &mut TreeNode, rule: &[u8], flags: NodeFlags) {
    let mut node = root;
    let mut end = rule.len();
    while end > 0 {
        let beg = rule[..end]
            .iter()
            .rposition(|&b| b == b'.')
            .map_or(0, |dot| dot + 1);
        let label = &rule[beg..end];
        let idx = match node
            .children
            .binary_search_by(|c| compare_labels(&c.label, label))
        {
            Ok(i) => i,
            Err(i) => {
                node.children.insert(i, TreeNode::new(label));
                i
            }
        };
        node = &mut node.children[idx];
        end = beg.saturating_sub(1);
    }
    node.flags |= flags;
}

/// Parse PSL text into `buf`, replacing any previous table. Returns the
/// number of rules inserted, the default wildcard included.
///
/// `to_ascii` is only consulted for lines carrying bytes outside
/// `[*a-z0-9.-]`; whatever it returns is stored as-is, since the position
/// scan's byte comparisons stay well-defined either way. Malformed lines
/// are skipped without error, per PSL convention.
pub fn parse_into<F>(text: &str, to_ascii: F, buf: &mut TableBuffer) -> usize
where
    F: Fn(&str) -> String,
{
    let mut root = TreeNode::new(b"");
    let mut rule_count = 1usize;

    // PSL algorithm step 2: the fallback rule is "*".
    insert_rule(&mut root, b"*", NodeFlags::RULE_TERMINUS);

    for raw in text.split(|c| c == '\n' || c == '\r') {
        let mut line = match raw.find("//") {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut flags = NodeFlags::RULE_TERMINUS;
        if line.as_bytes()[0] == b'!' {
            flags |= NodeFlags::EXCEPTION;
            line = &line[1..];
        }
        let ascii;
        let mut rule = line.as_bytes();
        if !rule
            .iter()
            .all(|&b| matches!(b, b'*' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-'))
        {
            ascii = to_ascii(&line.to_lowercase());
            rule = ascii.as_bytes();
        }
        if rule.is_empty() || rule.len() > RULE_MAX_LEN {
            continue;
        }
        insert_rule(&mut root, rule, flags);
        rule_count += 1;
    }

    let mut ser = Serializer::default();
    let root_at = ser.allocate(1);
    ser.store_node(root_at, &root);
    ser.assemble(buf);

    log::debug!(
        "parsed {} rules into a {}-byte table",
        rule_count,
        buf.len()
    );
    rule_count
}

/// Flattens the rule tree into tree words plus a character-data blob.
#[derive(Default)]
struct Serializer {
    /// Node words, indexed relative to the tree region.
    tree: Vec<u32>,
    chardata: Vec<u8>,
    /// Labels longer than the inline cap, deduplicated.
    label_offsets: HashMap<Vec<u8>, u32>,
}

impl Serializer {
    /// Reserve records for `count` sibling nodes; returns the word index of
    /// the first, relative to the tree region.
    fn allocate(&mut self, count: usize) -> usize {
        let at = self.tree.len();
        self.tree.resize(at + count * NODE_WORDS, 0);
        at
    }

    /// Fill the record at `inode`, pre-allocating each node's children as a
    /// contiguous run before descending into them.
    fn store_node(&mut self, inode: usize, node: &TreeNode) {
        self.tree[inode] = pack_node_word(node.label.len(), node.flags, node.children.len());
        self.tree[inode + 1] = if node.label.len() <= INLINE_LABEL_MAX {
            let mut packed = 0u32;
            for (i, &b) in node.label.iter().enumerate() {
                packed |= (b as u32) << (8 * i);
            }
            packed
        } else {
            self.chardata_offset(&node.label)
        };
        if node.children.is_empty() {
            self.tree[inode + 2] = 0;
        } else {
            let first = self.allocate(node.children.len());
            self.tree[inode + 2] = (TREE_BASE_WORD + first) as u32;
            for (i, child) in node.children.iter().enumerate() {
                self.store_node(first + i * NODE_WORDS, child);
            }
        }
    }

    fn chardata_offset(&mut self, label: &[u8]) -> u32 {
        if let Some(&offset) = self.label_offsets.get(label) {
            return offset;
        }
        let offset = self.chardata.len() as u32;
        self.chardata.extend_from_slice(label);
        self.label_offsets.insert(label.to_vec(), offset);
        offset
    }

    /// Copy tree words and character bytes into the buffer and point the
    /// scratch slots at them.
    fn assemble(&self, buf: &mut TableBuffer) {
        // The tree region is word-sized, so the character data lands on a
        // 4-byte boundary without padding.
        let chardata_offset = SCRATCH_SIZE + self.tree.len() * 4;
        buf.reserve(chardata_offset + self.chardata.len());
        for (i, &w) in self.tree.iter().enumerate() {
            buf.set_word(TREE_BASE_WORD + i, w);
        }
        buf.bytes_mut()[chardata_offset..chardata_offset + self.chardata.len()]
            .copy_from_slice(&self.chardata);
        buf.set_word(RULES_PTR_SLOT, TREE_BASE_WORD as u32);
        buf.set_word(CHARDATA_PTR_SLOT, chardata_offset as u32);
    }
}
