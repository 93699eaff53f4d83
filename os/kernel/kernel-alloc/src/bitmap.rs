//! Fixed-capacity bit vector over borrowed storage.
//!
//! Bit `i` lives in byte `i / 8` at position `i % 8` (LSB first). A set bit
//! marks an allocated unit. The bitmap never owns its bytes: the kernel
//! places them at a fixed address, tests hand in a `Vec`.
//!
//! Not safe under concurrent access; callers provide exclusion.

/// A bit per allocation unit, `1` meaning "in use".
pub struct Bitmap<'a> {
    bits: &'a mut [u8],
}

impl<'a> Bitmap<'a> {
    /// Wrap `storage` without touching its contents.
    #[inline]
    pub const fn new(storage: &'a mut [u8]) -> Self {
        Self { bits: storage }
    }

    /// Clear every bit.
    #[inline]
    pub fn init(&mut self) {
        self.bits.fill(0);
    }

    /// Capacity in bits.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits.len() * 8
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Address of the backing bytes, for diagnostics.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const u8 {
        self.bits.as_ptr()
    }

    /// Whether bit `index` is set.
    ///
    /// # Panics
    /// If `index` is outside the capacity.
    #[inline]
    #[must_use]
    pub fn test(&self, index: usize) -> bool {
        assert!(index < self.len(), "bit {index} out of range ({})", self.len());
        self.bits[index / 8] & (1 << (index % 8)) != 0
    }

    /// Set `count` bits starting at `index` to `value`.
    ///
    /// # Panics
    /// If the range extends past the capacity.
    pub fn set(&mut self, index: usize, count: usize, value: bool) {
        assert!(
            index.checked_add(count).is_some_and(|end| end <= self.len()),
            "bits {index}+{count} out of range ({})",
            self.len()
        );
        for i in index..index + count {
            let mask = 1u8 << (i % 8);
            if value {
                self.bits[i / 8] |= mask;
            } else {
                self.bits[i / 8] &= !mask;
            }
        }
    }

    /// Index of the lowest run of `count` clear bits.
    ///
    /// Returns `None` for `count == 0` or if no such run exists.
    #[must_use]
    pub fn scan(&self, count: usize) -> Option<usize> {
        if count == 0 || count > self.len() {
            return None;
        }

        let mut run = 0;
        let mut i = 0;
        while i < self.len() {
            // Whole bytes in use can be skipped at once.
            if i % 8 == 0 && self.bits[i / 8] == 0xFF {
                run = 0;
                i += 8;
                continue;
            }

            if self.test(i) {
                run = 0;
            } else {
                run += 1;
                if run == count {
                    return Some(i + 1 - count);
                }
            }
            i += 1;
        }
        None
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_lsb_first() {
        let mut raw = [0u8; 2];
        let mut bm = Bitmap::new(&mut raw);
        bm.set(0, 1, true);
        bm.set(9, 2, true);
        assert!(bm.test(0) && bm.test(9) && bm.test(10));
        assert!(!bm.test(1));
        assert_eq!(bm.count_set(), 3);
        assert_eq!(raw, [0b0000_0001, 0b0000_0110]);
    }

    #[test]
    fn init_clears_stale_bits() {
        let mut raw = [0xFFu8; 4];
        let mut bm = Bitmap::new(&mut raw);
        assert_eq!(bm.scan(1), None);
        bm.init();
        assert_eq!(bm.count_set(), 0);
        assert_eq!(bm.len(), 32);
    }

    #[test]
    fn scan_is_first_fit() {
        let mut raw = [0u8; 4];
        let mut bm = Bitmap::new(&mut raw);
        bm.set(0, 3, true);
        bm.set(5, 1, true);
        assert_eq!(bm.scan(1), Some(3));
        assert_eq!(bm.scan(2), Some(3));
        assert_eq!(bm.scan(3), Some(6));
        assert_eq!(bm.scan(26), Some(6));
        assert_eq!(bm.scan(27), None);
    }

    #[test]
    fn scan_crosses_full_bytes() {
        let mut raw = [0xFF, 0xFF, 0x7F, 0x00];
        let bm = Bitmap::new(&mut raw);
        assert_eq!(bm.scan(1), Some(23));
        assert_eq!(bm.scan(9), Some(23));
        assert_eq!(bm.scan(10), None);
    }

    #[test]
    fn degenerate_scans() {
        let mut raw = [0u8; 1];
        let bm = Bitmap::new(&mut raw);
        assert_eq!(bm.scan(0), None);
        assert_eq!(bm.scan(9), None);
        assert_eq!(bm.scan(8), Some(0));

        let mut none: [u8; 0] = [];
        let bm = Bitmap::new(&mut none);
        assert!(bm.is_empty());
        assert_eq!(bm.scan(1), None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_past_end_panics() {
        let mut raw = [0u8; 1];
        let mut bm = Bitmap::new(&mut raw);
        bm.set(6, 3, true);
    }
}
