//! Tests for the column-family key codec
//!
//! These tests verify:
//! - Distinct column families never share a physical key
//! - Byte order of logical keys is preserved within a column family
//! - Decoding inverts encoding
//! - Column family bounds contain exactly that family's keys

use cfkv::codec::{cf_bounds, cf_prefix, decode_key, encode_key, validate_cf, CF_SEPARATOR};
use cfkv::{StorageError, ALL_CFS};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_keys() -> Vec<Vec<u8>> {
    vec![
        Vec::new(),
        vec![0x00],
        vec![0x00, 0x00],
        b"_".to_vec(),
        b"a".to_vec(),
        b"a_b".to_vec(),
        b"ab".to_vec(),
        b"b".to_vec(),
        vec![0xFF],
        vec![0xFF, 0xFF, 0xFF],
    ]
}

fn sample_cfs() -> Vec<&'static str> {
    vec!["default", "lock", "write", "a", "ab", "cf1", "cf2", "\u{e9}t\u{e9}"]
}

// =============================================================================
// Injectivity
// =============================================================================

#[test]
fn test_distinct_cfs_never_collide() {
    let cfs = sample_cfs();
    let keys = sample_keys();

    for (i, a) in cfs.iter().enumerate() {
        for b in cfs.iter().skip(i + 1) {
            for k in &keys {
                assert_ne!(
                    encode_key(a, k).unwrap(),
                    encode_key(b, k).unwrap(),
                    "cf {:?} and {:?} collide on key {:?}",
                    a,
                    b,
                    k
                );
            }
        }
    }
}

#[test]
fn test_all_pairs_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for cf in sample_cfs() {
        for key in sample_keys() {
            assert!(seen.insert(encode_key(cf, &key).unwrap()));
        }
    }
}

#[test]
fn test_empty_key_has_distinct_encoding() {
    let empty = encode_key("default", b"").unwrap();
    assert_eq!(empty, cf_prefix("default").unwrap());
    assert_ne!(empty, encode_key("default", &[0x00]).unwrap());
    assert_eq!(decode_key(&empty), Some(("default", &b""[..])));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_order_preserved_within_cf() {
    let mut keys = sample_keys();
    keys.sort();

    for cf in sample_cfs() {
        for pair in keys.windows(2) {
            let lo = encode_key(cf, &pair[0]).unwrap();
            let hi = encode_key(cf, &pair[1]).unwrap();
            assert!(lo < hi, "order broken in {:?}: {:?} !< {:?}", cf, pair[0], pair[1]);
        }
    }
}

#[test]
fn test_bounds_contain_only_own_family() {
    for cf in sample_cfs() {
        let (start, end) = cf_bounds(cf).unwrap();

        for other in sample_cfs() {
            for key in sample_keys() {
                let physical = encode_key(other, &key).unwrap();
                let inside = physical >= start && physical < end;
                assert_eq!(
                    inside,
                    other == cf,
                    "{:?}/{:?} misclassified against bounds of {:?}",
                    other,
                    key,
                    cf
                );
            }
        }
    }
}

// =============================================================================
// Decoding / Validation
// =============================================================================

#[test]
fn test_decode_roundtrip() {
    for cf in sample_cfs() {
        for key in sample_keys() {
            let physical = encode_key(cf, &key).unwrap();
            let (decoded_cf, decoded_key) = decode_key(&physical).unwrap();
            assert_eq!(decoded_cf, cf);
            assert_eq!(decoded_key, key.as_slice());
        }
    }
}

#[test]
fn test_well_known_cfs_are_valid() {
    for cf in ALL_CFS {
        validate_cf(cf).unwrap();
    }
}

#[test]
fn test_separator_rejected_in_cf_name() {
    let name = format!("my{}cf", CF_SEPARATOR as char);
    match validate_cf(&name) {
        Err(StorageError::InvalidColumnFamily { name: rejected, .. }) => assert_eq!(rejected, name),
        other => panic!("expected InvalidColumnFamily, got {:?}", other),
    }
    assert!(cf_bounds("").is_err());
}
