//! Address set tracks exact presence of IPv4 addresses over the complete
//! 32-bit key space using a dense bitmap.
//!
//! # Data-structure design rationale
//!
//! ## Fixed memory footprint
//! The bitmap has one bit per possible key: `2^32 / 8` bytes = 512 MiB.
//! It is allocated once (zeroed) on construction and never grows, shrinks
//! or reallocates, regardless of how many keys are inserted.
//!
//! ## Constant time insert
//! - No hashing, probing, resizing or collision handling.
//! - Insert touches exactly one byte: `key >> 3` selects the byte and
//!   `key & 7` selects the bit within it (least significant bit first).
//! - Inserting the same key again leaves the set unchanged, which is
//!   what deduplicates repeated addresses.
//!
//! ## Linear count
//! `count` walks all 512 MiB once and sums per-byte population counts
//! from a precomputed 256-entry table.
//!
//! # Data storage format
//! The buffer layout is private. It is not an interchange format and no
//! compatibility across versions is promised.
use std::fmt::{Debug, Formatter};
use std::mem::size_of;

use crate::address::AddressKey;
use crate::popcount::count_ones;

/// Number of distinct keys representable in the set.
pub const DOMAIN_SIZE: u64 = 1 << 32;
/// Size of the presence bitmap in bytes.
pub const BITMAP_LEN: usize = (DOMAIN_SIZE / 8) as usize;

/// Chunk length used for vectorization friendly merges.
const MERGE_CHUNK_LEN: usize = 64;

/// Ensure that only 64-bit architecture is being used.
#[cfg(target_pointer_width = "64")]
pub struct AddressSet {
    /// Presence bitmap, exactly `BITMAP_LEN` bytes
    bits: Box<[u8]>,
}

impl AddressSet {
    /// Creates new empty `AddressSet` with all presence bits cleared
    #[inline]
    pub fn new() -> Self {
        Self {
            bits: vec![0u8; BITMAP_LEN].into_boxed_slice(),
        }
    }

    /// Insert `key` into `AddressSet`
    #[inline]
    pub fn insert(&mut self, key: AddressKey) {
        let (idx, mask) = Self::locate(key);
        // SAFETY: `idx` is at most `u32::MAX >> 3`, and `self.bits` always has `BITMAP_LEN` bytes.
        unsafe { *self.bits.get_unchecked_mut(idx) |= mask };
    }

    /// Return whether `key` was inserted
    #[inline]
    pub fn contains(&self, key: AddressKey) -> bool {
        let (idx, mask) = Self::locate(key);
        // SAFETY: `idx` is at most `u32::MAX >> 3`, and `self.bits` always has `BITMAP_LEN` bytes.
        unsafe { *self.bits.get_unchecked(idx) & mask != 0 }
    }

    /// Return number of distinct keys inserted
    pub fn count(&self) -> u64 {
        count_ones(&self.bits)
    }

    /// Merge `rhs` into `self`, so that `self` holds the union of both sets
    pub fn merge(&mut self, rhs: &AddressSet) {
        self.bits
            .chunks_exact_mut(MERGE_CHUNK_LEN)
            .zip(rhs.bits.chunks_exact(MERGE_CHUNK_LEN))
            // all-zero chunks of `rhs` are skipped, leaving untouched pages of `self` unwritten
            .filter(|(_, rhs)| rhs.iter().any(|&b| b != 0))
            .for_each(|(lhs, rhs)| {
                for (l, r) in lhs.iter_mut().zip(rhs) {
                    *l |= *r;
                }
            });
    }

    /// Return memory size of `AddressSet`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + self.bits.len()
    }

    /// Return byte index and bit mask of `key`
    #[inline]
    fn locate(key: AddressKey) -> (usize, u8) {
        ((key >> 3) as usize, 1 << (key & 7))
    }
}

impl Default for AddressSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AddressSet {
    /// Compare presence bitmaps
    fn eq(&self, rhs: &Self) -> bool {
        self.bits == rhs.bits
    }
}

impl Eq for AddressSet {}

impl Debug for AddressSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // the bitmap itself is far too large to print
        write!(f, "AddressSet {{ size: {} }}", self.size_of())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use test_case::test_case;

    fn key(s: &str) -> AddressKey {
        u32::from(s.parse::<Ipv4Addr>().unwrap())
    }

    #[test]
    fn test_insert() {
        // Create a new AddressSet.
        let mut set = AddressSet::new();

        // Ensure initial count is 0.
        assert_eq!(set.count(), 0);

        // Insert a key and validate count.
        set.insert(key("10.0.0.1"));
        assert_eq!(set.count(), 1);

        // Re-insert the same key, count should remain the same.
        set.insert(key("10.0.0.1"));
        assert_eq!(set.count(), 1);

        // Insert a new distinct key, count should increase.
        set.insert(key("10.0.0.2"));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_idempotent_insert() {
        let mut once = AddressSet::new();
        once.insert(0xdead_beef);

        let mut many = AddressSet::new();
        for _ in 0..1000 {
            many.insert(0xdead_beef);
        }

        assert_eq!(once, many);
        assert_eq!(many.count(), 1);
    }

    #[test_case(&["0.0.0.0"] => 1; "all zeros")]
    #[test_case(&["255.255.255.255"] => 1; "all ones")]
    #[test_case(&["0.0.0.0", "255.255.255.255"] => 2; "both boundaries")]
    #[test_case(&["1.2.3.4", "1.2.3.4", "1.2.3.5"] => 2; "duplicates")]
    #[test_case(&["0.0.0.7", "0.0.0.8"] => 2; "adjacent bytes")]
    fn test_count(addrs: &[&str]) -> u64 {
        let mut set = AddressSet::new();
        for a in addrs {
            set.insert(key(a));
        }
        set.count()
    }

    #[test]
    fn test_every_bit_of_a_byte() {
        // keys 8..16 share byte 1 and occupy all its bit offsets
        let mut set = AddressSet::new();
        for k in 8..16 {
            assert!(!set.contains(k));
            set.insert(k);
            assert!(set.contains(k));
        }
        assert!(!set.contains(7));
        assert!(!set.contains(16));
        assert_eq!(set.count(), 8);
    }

    #[test]
    fn test_dense_range() {
        let mut set = AddressSet::new();
        let start = key("192.168.0.0");
        for k in start..start + 65_536 {
            set.insert(k);
        }
        // insert the same range again in reverse order
        for k in (start..start + 65_536).rev() {
            set.insert(k);
        }
        assert_eq!(set.count(), 65_536);
        assert!(!set.contains(start - 1));
        assert!(!set.contains(start + 65_536));
    }

    #[test_case(&[], &[] => 0; "both empty")]
    #[test_case(&[1, 2, 3], &[] => 3; "empty rhs")]
    #[test_case(&[], &[1, 2, 3] => 3; "empty lhs")]
    #[test_case(&[1, 2, 3], &[3, 4] => 4; "overlapping")]
    #[test_case(&[0, u32::MAX], &[u32::MAX, 0] => 2; "boundaries")]
    fn test_merge(lhs_keys: &[u32], rhs_keys: &[u32]) -> u64 {
        let mut lhs = AddressSet::new();
        lhs_keys.iter().for_each(|&k| lhs.insert(k));
        let mut rhs = AddressSet::new();
        rhs_keys.iter().for_each(|&k| rhs.insert(k));

        lhs.merge(&rhs);
        for k in lhs_keys.iter().chain(rhs_keys) {
            assert!(lhs.contains(*k));
        }
        lhs.count()
    }

    #[test]
    fn test_merge_is_commutative() {
        let mut a = AddressSet::new();
        let mut b = AddressSet::new();
        [5, 17, 4096].iter().for_each(|&k| a.insert(k));
        [17, 99, u32::MAX].iter().for_each(|&k| b.insert(k));

        let mut ab = AddressSet::new();
        ab.merge(&a);
        ab.merge(&b);
        let mut ba = AddressSet::new();
        ba.merge(&b);
        ba.merge(&a);

        assert_eq!(ab, ba);
        assert_eq!(ab.count(), 5);
    }

    #[test]
    fn test_debug() {
        let set = AddressSet::default();
        assert_eq!(
            format!("{:?}", set),
            format!("AddressSet {{ size: {} }}", BITMAP_LEN + size_of::<Box<[u8]>>())
        );
    }
}
