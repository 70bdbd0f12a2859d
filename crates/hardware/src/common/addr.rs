//! Address Decoding.
//!
//! This module splits byte addresses into the fields a set-associative cache
//! indexes by. It provides the following:
//! 1. **Layout:** Offset and index widths derived from power-of-two block and set counts.
//! 2. **Decoding:** Pure shift-and-mask extraction of tag, set index, and block offset.
//! 3. **Composition:** The inverse operation, used to rebuild block addresses from a tag and index.

/// Field widths of a cache address.
///
/// `block_size` and `num_sets` must both be powers of two; the layout is
/// built from their base-2 logarithms and decoding is pure bit arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    offset_bits: u32,
    index_bits: u32,
    index_mask: u64,
}

/// An address split into its cache fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedAddr {
    /// Address bits above index and offset.
    pub tag: u64,
    /// Set index.
    pub index: usize,
    /// Byte offset within the block.
    pub offset: u64,
}

impl AddressLayout {
    /// Builds a layout for the given block size and set count.
    ///
    /// Returns `None` if either value is zero or not a power of two, or if the
    /// combined field widths do not fit in a 64-bit address.
    pub const fn new(block_size: u64, num_sets: u64) -> Option<Self> {
        if !block_size.is_power_of_two() || !num_sets.is_power_of_two() {
            return None;
        }
        let offset_bits = block_size.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        if offset_bits + index_bits >= u64::BITS {
            return None;
        }
        Some(Self {
            offset_bits,
            index_bits,
            index_mask: num_sets - 1,
        })
    }

    /// Number of block-offset bits (`log2(block_size)`).
    #[inline(always)]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of set-index bits (`log2(num_sets)`).
    #[inline(always)]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Mask applied to the shifted address to obtain the set index (`num_sets - 1`).
    #[inline(always)]
    pub const fn index_mask(&self) -> u64 {
        self.index_mask
    }

    /// Splits `addr` into tag, index, and offset.
    #[inline]
    pub const fn decode(&self, addr: u64) -> DecodedAddr {
        DecodedAddr {
            tag: addr >> (self.offset_bits + self.index_bits),
            index: ((addr >> self.offset_bits) & self.index_mask) as usize,
            offset: addr & ((1u64 << self.offset_bits) - 1),
        }
    }

    /// Reassembles an address from its fields.
    ///
    /// `compose(decode(a)) == a` for every address `a`.
    #[inline]
    pub const fn compose(&self, fields: DecodedAddr) -> u64 {
        (fields.tag << (self.offset_bits + self.index_bits))
            | ((fields.index as u64 & self.index_mask) << self.offset_bits)
            | fields.offset
    }

    /// Returns the first byte address of the block identified by `tag` and `index`.
    #[inline]
    pub const fn block_addr(&self, tag: u64, index: usize) -> u64 {
        self.compose(DecodedAddr {
            tag,
            index,
            offset: 0,
        })
    }
}
