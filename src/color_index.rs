/// Significant bits per channel used for histogram bucketing.
pub const SIG_BITS: u32 = 5;

/// Right shift that takes an 8-bit channel into bucket space.
pub const RIGHT_SHIFT: u32 = 8 - SIG_BITS;

/// Channel multiplier that takes a bucket coordinate back to 8-bit space.
pub const MULTIPLIER: u32 = 1 << RIGHT_SHIFT;

/// Highest bucket coordinate on any axis.
pub const MAX_BUCKET: u8 = (1 << SIG_BITS) - 1;

/// A packed `(r << 16) | (g << 8) | b` color key.
///
/// Each channel is masked to its most significant bits at encode time, so the
/// packing is always full-byte wide and [`decode`](Self::decode) never needs
/// to know the precision the index was built with. Distinct colors collapse
/// onto the same index under reduced precision; that is the bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorIndex(pub u32);

impl ColorIndex {
    /// Pack `(r, g, b)` keeping the top `sig_bits` bits of each channel.
    #[inline]
    pub fn encode(r: u8, g: u8, b: u8, sig_bits: u32) -> Self {
        debug_assert!((1..=8).contains(&sig_bits));
        let mask = (0xFFu32 << (8 - sig_bits)) & 0xFF;
        Self(((r as u32 & mask) << 16) | ((g as u32 & mask) << 8) | (b as u32 & mask))
    }

    /// Index of the 5-bit grid cell `(r, g, b)`.
    #[inline]
    pub fn from_bucket(r: u8, g: u8, b: u8) -> Self {
        Self(
            ((r as u32) << (16 + RIGHT_SHIFT))
                | ((g as u32) << (8 + RIGHT_SHIFT))
                | ((b as u32) << RIGHT_SHIFT),
        )
    }

    #[inline]
    pub fn decode(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Channels shifted right by `shift`, e.g. `bucket(RIGHT_SHIFT)` for grid
    /// coordinates.
    #[inline]
    pub fn bucket(self, shift: u32) -> [u8; 3] {
        let [r, g, b] = self.decode();
        [r >> shift, g >> shift, b >> shift]
    }
}
