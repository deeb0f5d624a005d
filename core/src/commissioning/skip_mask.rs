use crate::constants::MAX_SKIP_MASK_WIDTH;

/// One bit per position of a remote cluster list, set while the cluster is
/// still a binding candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipMask {
    bits: u16,
    width: usize,
}

impl SkipMask {
    /// Keep every position of a list of `width` clusters.
    ///
    /// Panics if `width` exceeds [`MAX_SKIP_MASK_WIDTH`].
    pub fn reset(&mut self, width: usize) {
        assert!(
            width <= MAX_SKIP_MASK_WIDTH,
            "skip mask width {width} exceeds {MAX_SKIP_MASK_WIDTH}"
        );
        self.width = width;
        self.bits = if width == 0 {
            0
        } else {
            u16::MAX >> (MAX_SKIP_MASK_WIDTH - width)
        };
    }

    /// Exclude `position` from binding.
    ///
    /// Panics if `position` is outside the current width.
    pub fn skip(&mut self, position: usize) {
        assert!(
            position < self.width,
            "skip position {position} outside mask of width {}",
            self.width
        );
        self.bits &= !(1 << position);
    }

    /// Positions beyond the width are always skipped
    pub fn is_skipped(&self, position: usize) -> bool {
        position >= self.width || self.bits & (1 << position) == 0
    }

    /// Raw bits, zero once nothing is left to bind
    pub fn mask(&self) -> u16 {
        self.bits
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of positions still kept
    pub fn kept(&self) -> usize {
        self.bits.count_ones() as usize
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_reset_widths() {
        let mut mask = SkipMask::default();
        mask.reset(0);
        assert_eq!(mask.mask(), 0);
        assert!(mask.is_skipped(0));

        mask.reset(3);
        assert_eq!(mask.mask(), 0b111);
        assert!(mask.is_skipped(3));

        mask.reset(16);
        assert_eq!(mask.mask(), u16::MAX);
        assert_eq!(mask.kept(), 16);
    }

    #[test]
    #[should_panic]
    fn test_skip_outside_width() {
        let mut mask = SkipMask::default();
        mask.reset(2);
        mask.skip(2);
    }

    #[test]
    #[should_panic]
    fn test_reset_too_wide() {
        SkipMask::default().reset(17);
    }

    proptest! {
        #[test]
        fn skipped_positions_clear_their_bits(
            width in 0usize..=16,
            positions in proptest::collection::vec(0usize..16, 0..16),
        ) {
            let mut mask = SkipMask::default();
            mask.reset(width);
            let skipped: Vec<usize> = positions.into_iter().filter(|p| *p < width).collect();
            for position in &skipped {
                mask.skip(*position);
            }

            let full = if width == 0 { 0 } else { u16::MAX >> (16 - width) };
            let cleared = skipped.iter().fold(0u16, |bits, p| bits | (1 << p));
            prop_assert_eq!(mask.mask(), !cleared & full);
            for position in 0..width {
                prop_assert_eq!(mask.is_skipped(position), skipped.contains(&position));
            }
        }
    }
}
