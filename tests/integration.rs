//! Integration tests for the public psltab API.

use base64::prelude::*;
use psltab::{
    reference_position, AcceleratorLoader, Error, PublicSuffixList, Selfie, SelfieCodec,
    SuffixAccelerator, TableBuffer, SELFIE_MAGIC,
};
use std::cell::Cell;
use std::rc::Rc;

const RULES: &str = "\
// ===BEGIN ICANN DOMAINS===
com
net
co.uk
uk
*.jp
!city.kawasaki.jp
kawasaki.jp
\u{516c}\u{53f8}.cn
";

/// The converter the library delegates internationalized lines to.
fn to_ascii(line: &str) -> String {
    idna::domain_to_ascii(line).unwrap_or_default()
}

fn parsed() -> PublicSuffixList {
    let mut psl = PublicSuffixList::new();
    psl.parse(RULES, to_ascii);
    psl
}

#[test]
fn test_lookup_end_to_end() {
    let mut psl = parsed();

    assert_eq!(psl.public_suffix("www.example.com"), "com");
    assert_eq!(psl.registrable_domain("www.example.com"), "example.com");
    assert_eq!(psl.public_suffix("a.b.example.co.uk"), "co.uk");
    assert_eq!(psl.registrable_domain("a.b.example.co.uk"), "example.co.uk");
    assert_eq!(psl.public_suffix("foo.bar.jp"), "bar.jp");
    assert_eq!(psl.public_suffix("city.kawasaki.jp"), "kawasaki.jp");

    assert!(psl.is_public_suffix("com"));
    assert!(psl.is_public_suffix("co.uk"));
    assert!(!psl.is_public_suffix("example.com"));
}

#[test]
fn test_internationalized_rule_matches_punycoded_query() {
    let mut psl = parsed();
    // The Unicode rule was stored through the converter as punycode.
    assert_eq!(psl.public_suffix("foo.xn--55qx5d.cn"), "xn--55qx5d.cn");
    assert_eq!(
        psl.registrable_domain("bar.foo.xn--55qx5d.cn"),
        "foo.xn--55qx5d.cn"
    );
    assert!(psl.is_public_suffix("xn--55qx5d.cn"));
}

#[test]
fn test_rule_count_and_table_size_reported() {
    let psl = parsed();
    // 8 lines plus the implicit "*".
    assert_eq!(psl.rule_count(), 9);
    assert!(psl.table_bytes() > 512);
    assert_eq!(psl.table_bytes() % 4, 0);
}

// ============================================================================
// Snapshots
// ============================================================================

struct Base64Codec;

impl SelfieCodec for Base64Codec {
    fn encode(&self, bytes: &[u8]) -> String {
        BASE64_STANDARD.encode(bytes)
    }

    fn decode_size(&self, encoded: &str) -> usize {
        BASE64_STANDARD.decode(encoded).map_or(0, |v| v.len())
    }

    fn decode(&self, encoded: &str, out: &mut [u8]) -> bool {
        match BASE64_STANDARD.decode(encoded) {
            Ok(v) if v.len() <= out.len() => {
                out[..v.len()].copy_from_slice(&v);
                true
            }
            _ => false,
        }
    }
}

#[test]
fn test_string_selfie_round_trip() {
    let mut psl = parsed();
    let snapshot = psl.to_selfie_string(&Base64Codec);
    assert!(snapshot.starts_with("2\t"));

    let mut restored = PublicSuffixList::new();
    assert!(restored.from_selfie_string(&snapshot, &Base64Codec));
    assert_eq!(restored.rule_count(), psl.rule_count());
    assert_eq!(
        restored.public_suffix("www.example.co.uk"),
        psl.public_suffix("www.example.co.uk")
    );
}

#[test]
fn test_string_selfie_with_wrong_version_tag() {
    let mut psl = parsed();
    let snapshot = psl.to_selfie_string(&Base64Codec);
    let tampered = format!("1{}", &snapshot[1..]);
    let mut restored = PublicSuffixList::new();
    assert!(!restored.from_selfie_string(&tampered, &Base64Codec));
    assert_eq!(restored.public_suffix("example.com"), "");
}

#[test]
fn test_structured_selfie_through_serde() {
    let psl = parsed();
    let selfie = psl.to_selfie();
    let json = serde_json::to_string(&selfie).unwrap();
    let decoded: Selfie = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, selfie);
    assert_eq!(decoded.magic, SELFIE_MAGIC);

    let mut restored = PublicSuffixList::new();
    assert!(restored.from_selfie(&decoded));
    assert_eq!(restored.public_suffix("foo.bar.jp"), "bar.jp");
}

#[test]
fn test_selfie_file_round_trip() {
    let psl = parsed();
    let path = std::env::temp_dir().join("psltab-integration-selfie.bin");
    psl.store_selfie(&path).unwrap();

    let mut restored = PublicSuffixList::new();
    restored.load_selfie(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(restored.rule_count(), psl.rule_count());
    assert_eq!(restored.public_suffix("city.kawasaki.jp"), "kawasaki.jp");
    assert!(restored.is_public_suffix("kawasaki.jp"));
}

#[test]
fn test_load_selfie_missing_file_is_io_error() {
    let mut psl = PublicSuffixList::new();
    let missing = std::env::temp_dir().join("psltab-no-such-file.bin");
    assert!(matches!(psl.load_selfie(&missing), Err(Error::Io(_))));
}

// ============================================================================
// Accelerator backend
// ============================================================================

/// Delegates to the reference scan while counting invocations, standing in
/// for a native module sharing the buffer.
struct CountingAccelerator {
    calls: Rc<Cell<usize>>,
}

impl SuffixAccelerator for CountingAccelerator {
    fn public_suffix_position(&mut self, buf: &mut TableBuffer) -> i32 {
        self.calls.set(self.calls.get() + 1);
        reference_position(buf)
    }
}

struct CountingLoader {
    calls: Rc<Cell<usize>>,
}

impl AcceleratorLoader for CountingLoader {
    fn load(&self) -> psltab::Result<Box<dyn SuffixAccelerator>> {
        Ok(Box::new(CountingAccelerator {
            calls: Rc::clone(&self.calls),
        }))
    }
}

struct FailingLoader;

impl AcceleratorLoader for FailingLoader {
    fn load(&self) -> psltab::Result<Box<dyn SuffixAccelerator>> {
        Err(Error::AcceleratorUnavailable("no module".to_string()))
    }
}

#[test]
fn test_accelerator_swap_and_parity() {
    let mut psl = parsed();
    let reference_answer = psl.public_suffix("a.b.example.co.uk").to_string();

    let calls = Rc::new(Cell::new(0));
    assert!(psl.enable_accelerator(&CountingLoader {
        calls: Rc::clone(&calls),
    }));

    assert_eq!(psl.public_suffix("a.b.example.co.uk"), reference_answer);
    assert_eq!(psl.registrable_domain("foo.bar.jp"), "foo.bar.jp");
    assert!(psl.is_public_suffix("com"));
    assert!(calls.get() >= 3);

    assert!(psl.disable_accelerator());
    assert!(!psl.disable_accelerator());
    let after = calls.get();
    assert_eq!(psl.public_suffix("a.b.example.co.uk"), reference_answer);
    assert_eq!(calls.get(), after);
}

#[test]
fn test_failed_accelerator_load_keeps_reference_lookup() {
    let mut psl = parsed();
    assert!(!psl.enable_accelerator(&FailingLoader));
    assert!(!psl.disable_accelerator());
    assert_eq!(psl.public_suffix("www.example.com"), "com");
}

// ============================================================================
// Invariants over assorted hostnames
// ============================================================================

#[test]
fn test_suffix_is_always_label_boundary_suffix() {
    let mut psl = parsed();
    for host in [
        "www.example.com",
        "example.com",
        "com",
        "a.b.example.co.uk",
        "foo.bar.jp",
        "city.kawasaki.jp",
        "www.city.kawasaki.jp",
        "unknownsingle",
        "deep.chain.of.labels.example.net",
    ] {
        let suffix = psl.public_suffix(host).to_string();
        if suffix.is_empty() {
            continue;
        }
        assert!(host.ends_with(&suffix), "{} vs {}", host, suffix);
        if suffix.len() < host.len() {
            assert_eq!(host.as_bytes()[host.len() - suffix.len() - 1], b'.');
        }

        let domain = psl.registrable_domain(host).to_string();
        if !domain.is_empty() {
            // One extra label, no more.
            let extra = &domain[..domain.len() - suffix.len() - 1];
            assert!(!extra.is_empty());
            assert!(!extra.contains('.'));
        }
    }
}

#[test]
fn test_upper_and_lower_agree() {
    let mut psl = parsed();
    for host in ["WWW.EXAMPLE.COM", "A.B.EXAMPLE.CO.UK", "FOO.BAR.JP"] {
        let upper = psl.public_suffix(host).to_string();
        let lower = psl.public_suffix(&host.to_lowercase()).to_string();
        assert_eq!(upper, lower);
    }
}
