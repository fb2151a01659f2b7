//! Shared math utilities for the pixel stages.

/// Map a possibly out-of-range index onto `0..len` by reflect-101 mirroring
/// (`dcb|abcd|cba`), the border mode of the sharpen and denoise stages.
///
/// Offsets larger than the image bounce repeatedly. `len` must be > 0.
pub fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = index;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Round a float sample to the nearest integer in `0..=255`.
pub fn round_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Clamp an integer sample into `0..=255`.
pub fn clamp_to_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
