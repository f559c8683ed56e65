//! Pluggable lookup backends.
//!
//! The position scan can be swapped for an external accelerator operating
//! on the same buffer layout, e.g. a native module sharing the buffer as a
//! linear memory. Enabling one is a capability swap: the surrounding code
//! never assumes which implementation is active, and any load failure
//! leaves the reference scan serving lookups.

use crate::error::Result;
use crate::table::{matcher, TableBuffer};

/// Alternative implementation of the position scan.
///
/// Implementations run on little-endian hosts, read the whole buffer, and
/// may write only the scratch region (bytes `0..512`), exactly as the
/// reference scan does.
pub trait SuffixAccelerator {
    /// Scan for the longest matching rule over a prepared scratch region.
    /// The contract is that of [`reference_position`].
    fn public_suffix_position(&mut self, buf: &mut TableBuffer) -> i32;
}

/// Acquires an accelerator instance, possibly performing I/O.
pub trait AcceleratorLoader {
    fn load(&self) -> Result<Box<dyn SuffixAccelerator>>;
}

/// The built-in scan, exposed so accelerator implementations can use it as
/// a parity oracle.
pub fn reference_position(buf: &mut TableBuffer) -> i32 {
    matcher::public_suffix_position(buf)
}

/// The active lookup implementation.
pub(crate) enum Backend {
    Reference,
    Accelerated(Box<dyn SuffixAccelerator>),
}

impl Backend {
    pub(crate) fn position(&mut self, buf: &mut TableBuffer) -> i32 {
        match self {
            Backend::Reference => matcher::public_suffix_position(buf),
            Backend::Accelerated(acc) => acc.public_suffix_position(buf),
        }
    }

    pub(crate) fn is_accelerated(&self) -> bool {
        matches!(self, Backend::Accelerated(_))
    }
}
