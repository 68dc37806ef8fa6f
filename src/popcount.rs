//! Byte population count driven by a 256-entry lookup table.
//!
//! The table is computed at compile time and lives in read-only memory, so
//! there is no initialisation order to get wrong and nothing to mutate.

/// Number of set bits for every possible byte value.
pub(crate) const BIT_COUNTS: [u8; 256] = build_table();

/// Number of bytes summed into a `u32` before widening to `u64`.
/// `CHUNK_LEN * 8` must fit into `u32`.
const CHUNK_LEN: usize = 4096;

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        // clear lowest set bit until nothing is left
        let mut b = i;
        let mut count = 0u8;
        while b != 0 {
            count += 1;
            b &= b - 1;
        }
        table[i] = count;
        i += 1;
    }
    table
}

/// Return number of set bits of a single byte
#[inline]
pub(crate) fn bits_in_byte(b: u8) -> u32 {
    u32::from(BIT_COUNTS[usize::from(b)])
}

/// Return total number of set bits across `bytes`.
///
/// Bytes are processed in fixed-size chunks via `chunks_exact`, which lets the
/// compiler keep the per-chunk sum in a narrow accumulator.
#[inline]
pub(crate) fn count_ones(bytes: &[u8]) -> u64 {
    let chunks = bytes.chunks_exact(CHUNK_LEN);
    let tail = chunks.remainder();
    let mut total: u64 = chunks
        .map(|chunk| u64::from(chunk.iter().map(|&b| bits_in_byte(b)).sum::<u32>()))
        .sum();
    total += tail.iter().map(|&b| u64::from(bits_in_byte(b))).sum::<u64>();
    total
}
