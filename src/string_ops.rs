//! Reference operation bundle for text keys and values.

use std::io::{self, Write};

use crate::ops::{KeyOps, ValueOps};

/// Text bundle: djb2 accumulation finalized with [`fmix32`], owned copies as
/// `Box<str>`, byte-wise equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringOps;

/// Shared, immutable instance; tables accept `&STRING_OPS` as either bundle.
pub static STRING_OPS: StringOps = StringOps;

/// xor-shift / multiply / xor-shift finalizer.
#[inline]
pub fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x3243_f6a9);
    h ^= h >> 16;
    h
}

/// `h = h * 33 + byte`, seeded with 5381.
///
/// Bytes are added as unsigned values, so text outside ASCII hashes
/// differently from C implementations that read the bytes as signed `char`.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(5381u32, |h, &b| {
        (h << 5).wrapping_add(h).wrapping_add(u32::from(b))
    })
}

/// Writes `s` verbatim; suitable as a `debug_print` key or value printer.
pub fn print_str<W: Write + ?Sized>(out: &mut W, s: &str) -> io::Result<()> {
    out.write_all(s.as_bytes())
}

impl KeyOps for StringOps {
    type Key = str;
    type Owned = Box<str>;

    fn hash_key(&self, key: &str) -> u32 {
        fmix32(djb2(key.as_bytes()))
    }

    fn clone_key(&self, key: &str) -> Box<str> {
        Box::from(key)
    }

    fn key_eq(&self, a: &str, b: &str) -> bool {
        a.as_bytes() == b.as_bytes()
    }
}

impl ValueOps for StringOps {
    type Value = str;
    type Owned = Box<str>;

    fn clone_value(&self, value: &str) -> Box<str> {
        Box::from(value)
    }

    fn value_eq(&self, a: &str, b: &str) -> bool {
        a.as_bytes() == b.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn djb2_matches_known_values() {
        assert_eq!(djb2(b""), 5381);
        // 5381 * 33 + 'a'
        assert_eq!(djb2(b"a"), 177_670);
        assert_eq!(djb2(b"ab"), 177_670u32.wrapping_mul(33).wrapping_add(98));
    }

    #[test]
    fn fmix32_fixes_zero_and_mixes_low_bits() {
        assert_eq!(fmix32(0), 0);
        assert_ne!(fmix32(1) & 0x1f, fmix32(2) & 0x1f);
    }

    #[test]
    fn clone_is_independent_copy() {
        let src = String::from("hello");
        let owned = STRING_OPS.clone_key(&src);
        drop(src);
        assert_eq!(&*owned, "hello");
        STRING_OPS.free_key(owned);
    }

    #[test]
    fn equality_and_hash_agree() {
        let a = "key";
        let b = String::from("key");
        assert!(STRING_OPS.key_eq(a, &b));
        assert_eq!(STRING_OPS.hash_key(a), STRING_OPS.hash_key(&b));
        assert!(!STRING_OPS.key_eq("key", "kez"));
        assert!(STRING_OPS.value_eq("v", "v"));
    }

    #[test]
    fn print_str_writes_bytes() {
        let mut out = Vec::new();
        print_str(&mut out, "xyz").unwrap();
        assert_eq!(out, b"xyz");
    }
}
