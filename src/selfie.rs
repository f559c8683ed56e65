//! Table snapshots.
//!
//! A selfie is a verbatim copy of the buffer, taken after the scratch so a
//! restore is immediately usable without any fix-up pass. Two interchangeable
//! forms exist: a structured record of the buffer's words, and a
//! version-tagged string wrapping the raw bytes in a caller-supplied codec.
//! A third, file-backed framing serves local persistence.

use std::fs;
use std::path::Path;

use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::format::{SCRATCH_SIZE, SELFIE_MAGIC};
use crate::table::TableBuffer;

/// Structured snapshot of the whole table buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selfie {
    /// Layout version; must equal [`SELFIE_MAGIC`](crate::SELFIE_MAGIC).
    pub magic: u32,
    /// Complete 32-bit-word contents of the buffer.
    pub words: Vec<u32>,
}

/// Bytes-to-string codec for the string snapshot form.
pub trait SelfieCodec {
    /// Encode raw buffer bytes into a transport-friendly string.
    fn encode(&self, bytes: &[u8]) -> String;
    /// Decoded byte length of `encoded`, or 0 when malformed.
    fn decode_size(&self, encoded: &str) -> usize;
    /// Decode `encoded` into `out`, sized by [`decode_size`](Self::decode_size).
    /// Returns false on failure.
    fn decode(&self, encoded: &str, out: &mut [u8]) -> bool;
}

pub(crate) fn to_string_form(buf: &TableBuffer, codec: &dyn SelfieCodec) -> String {
    format!("{}\t{}", SELFIE_MAGIC, codec.encode(buf.bytes()))
}

pub(crate) fn from_string_form(s: &str, codec: &dyn SelfieCodec, buf: &mut TableBuffer) -> bool {
    let Some(tab) = s.find('\t') else {
        return false;
    };
    if s[..tab].parse::<u32>() != Ok(SELFIE_MAGIC) {
        return false;
    }
    let body = &s[tab + 1..];
    let size = codec.decode_size(body);
    if size < SCRATCH_SIZE {
        return false;
    }
    // Decode to the side first so a codec failure leaves the table intact.
    let mut data = vec![0u8; size];
    if !codec.decode(body, &mut data) {
        return false;
    }
    buf.load_bytes(&data);
    true
}

pub(crate) fn from_structured(selfie: &Selfie, buf: &mut TableBuffer) -> Result<()> {
    if selfie.magic != SELFIE_MAGIC {
        return Err(Error::SelfieMagic {
            expected: SELFIE_MAGIC,
            actual: selfie.magic,
        });
    }
    if selfie.words.len() * 4 < SCRATCH_SIZE {
        return Err(Error::SelfieTruncated(selfie.words.len() * 4));
    }
    buf.load_words(&selfie.words);
    Ok(())
}

/// File framing: a 4-byte little-endian magic, then the buffer bytes.
pub(crate) fn store(buf: &TableBuffer, path: &Path) -> Result<()> {
    let mut data = Vec::with_capacity(4 + buf.len());
    data.extend_from_slice(&SELFIE_MAGIC.to_le_bytes());
    data.extend_from_slice(buf.bytes());
    fs::write(path, data)?;
    Ok(())
}

pub(crate) fn load(path: &Path, buf: &mut TableBuffer) -> Result<()> {
    let file = fs::File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    if mmap.len() < 4 + SCRATCH_SIZE {
        return Err(Error::SelfieTruncated(mmap.len()));
    }
    let magic = u32::from_le_bytes([mmap[0], mmap[1], mmap[2], mmap[3]]);
    if magic != SELFIE_MAGIC {
        return Err(Error::SelfieMagic {
            expected: SELFIE_MAGIC,
            actual: magic,
        });
    }
    buf.load_bytes(&mmap[4..]);
    Ok(())
}
