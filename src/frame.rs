//! Layout of the module-owned RGBA8 frame buffer.

use crate::error::ConfigError;

pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    width: u32,
    height: u32,
}

impl FrameLayout {
    /// Builds a layout from the dimensions the module reports at start-up.
    pub fn from_reported(width: i32, height: i32) -> Result<Self, ConfigError> {
        if width <= 0 || height <= 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        let (width, height) = (width as u32, height as u32);
        // Module memory is addressed with 32-bit offsets.
        let fits = (width as u64) * (height as u64) * (BYTES_PER_PIXEL as u64) <= u32::MAX as u64;
        if !fits {
            return Err(ConfigError::FrameTooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn byte_len(&self) -> usize {
        BYTES_PER_PIXEL * self.width as usize * self.height as usize
    }

    pub fn check_len(&self, actual: usize) -> Result<(), ConfigError> {
        let expected = self.byte_len();
        if actual != expected {
            return Err(ConfigError::BufferLength { expected, actual });
        }
        Ok(())
    }
}

/// Where the frame buffer lives inside module memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRegion {
    offset: u32,
    len: usize,
}

impl FrameRegion {
    pub fn locate(layout: FrameLayout, offset: u32, memory_len: usize) -> Result<Self, ConfigError> {
        let region = Self {
            offset,
            len: layout.byte_len(),
        };
        region.check_within(memory_len)?;
        Ok(region)
    }

    /// Memory can grow between draws, so callers re-check against the current size.
    pub fn check_within(&self, memory_len: usize) -> Result<(), ConfigError> {
        let end = (self.offset as usize).checked_add(self.len);
        match end {
            Some(end) if end <= memory_len => Ok(()),
            _ => Err(ConfigError::OutOfBounds {
                offset: self.offset,
                len: self.len,
                memory_len,
            }),
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn byte_len(&self) -> usize {
        self.len
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_non_positive_dimensions() {
        for (w, h) in [(0, 10), (10, 0), (-1, 5), (5, -1), (0, 0)] {
            assert_eq!(
                FrameLayout::from_reported(w, h),
                Err(ConfigError::InvalidDimensions { width: w, height: h })
            );
        }
    }

    #[test]
    fn boundary_sizes() {
        let one = FrameLayout::from_reported(1, 1).unwrap();
        assert_eq!(one.byte_len(), 4);

        let square = FrameLayout::from_reported(400, 400).unwrap();
        assert_eq!((square.width(), square.height()), (400, 400));
        assert_eq!(square.byte_len(), 640_000);
    }

    #[test]
    fn rejects_frames_beyond_address_space() {
        assert_eq!(
            FrameLayout::from_reported(65_536, 65_536),
            Err(ConfigError::FrameTooLarge {
                width: 65_536,
                height: 65_536
            })
        );
    }

    #[test]
    fn mismatched_buffer_length() {
        let layout = FrameLayout::from_reported(320, 240).unwrap();
        assert!(layout.check_len(320 * 240 * 4).is_ok());
        assert_eq!(
            layout.check_len(320 * 240 * 3),
            Err(ConfigError::BufferLength {
                expected: 307_200,
                actual: 230_400
            })
        );
    }

    #[test]
    fn region_must_fit_in_memory() {
        let layout = FrameLayout::from_reported(2, 2).unwrap();
        assert!(FrameRegion::locate(layout, 48, 64).is_ok());
        assert_eq!(
            FrameRegion::locate(layout, 49, 64),
            Err(ConfigError::OutOfBounds {
                offset: 49,
                len: 16,
                memory_len: 64
            })
        );

        let region = FrameRegion::locate(layout, 0, 16).unwrap();
        assert!(region.check_within(8).is_err());
        assert!(region.check_within(65_536).is_ok());
    }

    proptest! {
        #[test]
        fn layout_matches_reported_size(w in 1i32..=4096, h in 1i32..=4096) {
            let layout = FrameLayout::from_reported(w, h).unwrap();
            prop_assert_eq!(layout.width(), w as u32);
            prop_assert_eq!(layout.height(), h as u32);
            prop_assert_eq!(layout.byte_len(), 4 * w as usize * h as usize);
            prop_assert!(layout.check_len(layout.byte_len()).is_ok());
            prop_assert!(layout.check_len(layout.byte_len() + 1).is_err());
        }
    }
}
