use image::{
    imageops::{self, FilterType},
    GrayImage,
};

/// Difference hash of a grayscale frame.
///
/// The frame is shrunk to `(grid + 1) x grid` pixels and every pixel is compared with its
/// right-hand neighbour. A set bit means brightness increases from left to right. Bits are
/// packed row-major, first comparison in the most significant position, so a grid of 8
/// fills all 64 bits.
pub fn dhash(frame: &GrayImage, grid: u32) -> u64 {
    debug_assert!(grid > 0 && grid * grid <= 64);

    let small = imageops::resize(frame, grid + 1, grid, FilterType::Lanczos3);

    let mut hash = 0u64;
    for y in 0..grid {
        for x in 0..grid {
            let left = small.get_pixel(x, y).0[0];
            let right = small.get_pixel(x + 1, y).0[0];
            hash = (hash << 1) | u64::from(right > left);
        }
    }
    hash
}

/// Number of differing bits between two frame hashes.
pub fn hamming_distance(x: u64, y: u64) -> u32 {
    (x ^ y).count_ones()
}

#[cfg(test)]
mod test {
    use super::*;

    fn horizontal_ramp(size: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, _y| image::Luma([(x * 4) as u8]))
    }

    #[test]
    fn test_brightening_ramp_sets_every_bit() {
        assert_eq!(dhash(&horizontal_ramp(64), 8), u64::MAX);
    }

    #[test]
    fn test_darkening_ramp_sets_no_bits() {
        let frame = GrayImage::from_fn(64, 64, |x, _y| image::Luma([(252 - x * 4) as u8]));
        assert_eq!(dhash(&frame, 8), 0);
    }

    #[test]
    fn test_flat_frame_sets_no_bits() {
        let frame = GrayImage::from_pixel(64, 64, image::Luma([128]));
        assert_eq!(dhash(&frame, 8), 0);
    }

    #[test]
    fn test_smaller_grid_uses_fewer_bits() {
        assert_eq!(dhash(&horizontal_ramp(64), 4), 0xFFFF);
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(0, 0), 0);
        assert_eq!(hamming_distance(u64::MAX, u64::MAX), 0);
        assert_eq!(hamming_distance(0, u64::MAX), 64);
        assert_eq!(hamming_distance(0b1011, 0b0001), 2);
        assert_eq!(hamming_distance(0b1011, 0b0001), hamming_distance(0b0001, 0b1011));
    }
}
