//! The public suffix list instance.

use std::path::Path;

use crate::accel::{AcceleratorLoader, Backend};
use crate::error::Result;
use crate::selfie::{self, Selfie, SelfieCodec};
use crate::table::format::{LABEL_INDICES_SLOT, SCRATCH_SIZE, SELFIE_MAGIC, SUFFIX_NOT_FOUND_SLOT};
use crate::table::{builder, matcher, TableBuffer};

/// An in-memory Public Suffix List compiled into a flat lookup table.
///
/// Queries use the buffer's scratch region as per-call mutable state, so an
/// instance is not internally synchronized: share one per thread, or restore
/// clones from a common [`Selfie`]. Replacing the table (`parse`,
/// `from_selfie`) must not overlap with queries.
///
/// # Example
///
/// ```
/// use psltab::PublicSuffixList;
///
/// let mut psl = PublicSuffixList::new();
/// psl.parse("com\nco.uk\n", |s| s.to_string());
/// assert_eq!(psl.public_suffix("www.example.co.uk"), "co.uk");
/// assert_eq!(psl.registrable_domain("www.example.co.uk"), "example.co.uk");
/// assert!(psl.is_public_suffix("co.uk"));
/// ```
pub struct PublicSuffixList {
    buf: TableBuffer,
    backend: Backend,
    /// The previously prepared hostname, lowercased. Query results borrow
    /// from it, which keeps them case-normalized.
    hostname_arg: String,
    rule_count: usize,
}

impl Default for PublicSuffixList {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicSuffixList {
    /// Create an empty list. Every query answers empty / false until
    /// [`parse`](Self::parse) or a snapshot restore populates the table.
    pub fn new() -> Self {
        Self {
            buf: TableBuffer::new(),
            backend: Backend::Reference,
            hostname_arg: String::new(),
            rule_count: 0,
        }
    }

    /// Parse PSL text, replacing any previous table.
    ///
    /// `to_ascii` converts a lowercased Unicode line to its ASCII
    /// (punycode) form; it is only consulted for lines with bytes outside
    /// `[*a-z0-9.-]`. Malformed lines are skipped, so this never fails.
    pub fn parse<F>(&mut self, text: &str, to_ascii: F)
    where
        F: Fn(&str) -> String,
    {
        self.rule_count = builder::parse_into(text, to_ascii, &mut self.buf);
        self.reset_scratch();
    }

    /// Number of rules in the current table, the default `*` included.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Size in bytes of the backing buffer, scratch included.
    pub fn table_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Longest public suffix of `hostname`, or the empty string.
    pub fn public_suffix(&mut self, hostname: &str) -> &str {
        if hostname.starts_with('.') || self.prepare(hostname) == 0 {
            return "";
        }
        let cursor = self.backend.position(&mut self.buf);
        if cursor < 0 {
            return "";
        }
        let beg = self.buf.byte(cursor as usize + 1) as usize;
        &self.hostname_arg[beg..]
    }

    /// Public suffix plus one label, or the empty string when `hostname` is
    /// itself a suffix (or matches nothing).
    pub fn registrable_domain(&mut self, hostname: &str) -> &str {
        if hostname.starts_with('.') || self.prepare(hostname) == 0 {
            return "";
        }
        let cursor = self.backend.position(&mut self.buf);
        if cursor < 0 {
            return "";
        }
        let cursor = cursor as usize;
        if self.buf.byte(cursor + 1) == 0 {
            // The suffix already consumed the whole hostname.
            return "";
        }
        let beg = self.buf.byte(cursor + 3) as usize;
        &self.hostname_arg[beg..]
    }

    /// Whether `hostname` itself is a listed public suffix. A hostname that
    /// only matches through the root wildcard fallback is not considered
    /// listed.
    pub fn is_public_suffix(&mut self, hostname: &str) -> bool {
        if hostname.starts_with('.') || self.prepare(hostname) == 0 {
            return false;
        }
        self.buf.set_byte(SUFFIX_NOT_FOUND_SLOT, 0);
        let cursor = self.backend.position(&mut self.buf);
        cursor >= 0
            && self.buf.byte(cursor as usize + 1) == 0
            && self.buf.byte(SUFFIX_NOT_FOUND_SLOT) == 0
    }

    /// Snapshot the whole buffer as a structured record.
    pub fn to_selfie(&self) -> Selfie {
        Selfie {
            magic: SELFIE_MAGIC,
            words: self.buf.words(),
        }
    }

    /// Snapshot as a version-tagged string using `codec`.
    pub fn to_selfie_string(&self, codec: &dyn SelfieCodec) -> String {
        selfie::to_string_form(&self.buf, codec)
    }

    /// Restore a structured snapshot. Returns false on a magic or shape
    /// mismatch, leaving the current table untouched.
    pub fn from_selfie(&mut self, selfie: &Selfie) -> bool {
        match selfie::from_structured(selfie, &mut self.buf) {
            Ok(()) => {
                self.after_restore();
                true
            }
            Err(e) => {
                log::warn!("rejected snapshot: {}", e);
                false
            }
        }
    }

    /// Restore a string snapshot previously produced with the symmetric
    /// codec. Returns false on a malformed prefix or codec failure, leaving
    /// the current table untouched.
    pub fn from_selfie_string(&mut self, s: &str, codec: &dyn SelfieCodec) -> bool {
        if selfie::from_string_form(s, codec, &mut self.buf) {
            self.after_restore();
            true
        } else {
            log::warn!("rejected string snapshot");
            false
        }
    }

    /// Persist the raw snapshot framing to `path`.
    pub fn store_selfie(&self, path: &Path) -> Result<()> {
        selfie::store(&self.buf, path)
    }

    /// Restore from a snapshot file written by
    /// [`store_selfie`](Self::store_selfie). The file is memory-mapped and
    /// validated before any state changes.
    pub fn load_selfie(&mut self, path: &Path) -> Result<()> {
        selfie::load(path, &mut self.buf)?;
        self.after_restore();
        Ok(())
    }

    /// Swap in an accelerated position scan. Returns false and keeps the
    /// reference implementation on any failure, including unsupported
    /// (big-endian) hosts.
    pub fn enable_accelerator(&mut self, loader: &dyn AcceleratorLoader) -> bool {
        if cfg!(target_endian = "big") {
            log::warn!("accelerator requires a little-endian host");
            return false;
        }
        match loader.load() {
            Ok(acc) => {
                self.backend = Backend::Accelerated(acc);
                log::info!("accelerated suffix lookup enabled");
                true
            }
            Err(e) => {
                log::warn!("accelerator unavailable, keeping reference lookup: {}", e);
                false
            }
        }
    }

    /// Revert to the reference scan. Returns whether an accelerator was
    /// active.
    pub fn disable_accelerator(&mut self) -> bool {
        let was_accelerated = self.backend.is_accelerated();
        self.backend = Backend::Reference;
        was_accelerated
    }

    /// Write `hostname` into the scratch; a no-op when it matches the
    /// cached argument. Returns the prepared length, 0 meaning nothing to
    /// match against.
    fn prepare(&mut self, hostname: &str) -> usize {
        if self.buf.len() < SCRATCH_SIZE {
            return 0;
        }
        if hostname == self.hostname_arg && !hostname.is_empty() {
            return self.buf.byte(LABEL_INDICES_SLOT) as usize;
        }
        self.hostname_arg.clear();
        self.hostname_arg.push_str(hostname);
        self.hostname_arg.make_ascii_lowercase();
        matcher::prepare(&mut self.buf, &self.hostname_arg)
    }

    fn reset_scratch(&mut self) {
        self.hostname_arg.clear();
        self.buf.reset_scratch();
    }

    fn after_restore(&mut self) {
        self.reset_scratch();
        self.rule_count = matcher::count_rules(&self.buf);
    }
}
