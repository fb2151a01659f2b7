//! Contrast-limited adaptive histogram equalization (CLAHE).
//!
//! The luminance plane is split into a `grid_size × grid_size` grid of
//! tiles. Each tile gets its own equalization curve from a histogram whose
//! bins are capped at `clip_limit` times the mean bin height, with the
//! clipped excess spread back over all bins. Pixels map through a bilinear
//! blend of the four nearest tile curves.
//!
//! The luminance change is applied to R, G and B at half strength, which
//! lifts local contrast without shifting hue.

use image::{Rgb, RgbImage};

use crate::config::ClaheConfig;
use crate::math::round_to_u8;

/// Fraction of the equalized luminance shift added to each channel.
const BLEND: f32 = 0.5;

/// Apply CLAHE to `image`.
#[must_use = "returns the equalized image"]
pub fn clahe(image: &RgbImage, config: &ClaheConfig) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let (w, h) = (width as usize, height as usize);

    let luma: Vec<u8> = image.pixels().map(|p| luminance(p.0)).collect();

    // Never more tiles than pixels along an axis; the last tile on each axis
    // absorbs the remainder.
    let grid = config.grid_size as usize;
    let tiles = Tiles::new(w.min(grid), h.min(grid), w, h);

    let mut curves = Vec::with_capacity(tiles.nx * tiles.ny);
    for ty in 0..tiles.ny {
        for tx in 0..tiles.nx {
            let (x0, x1) = tiles.span_x(tx);
            let (y0, y1) = tiles.span_y(ty);
            let mut histogram = [0u32; 256];
            for y in y0..y1 {
                for &v in &luma[y * w + x0..y * w + x1] {
                    histogram[v as usize] += 1;
                }
            }
            curves.push(equalization_curve(histogram, config.clip_limit));
        }
    }

    RgbImage::from_fn(width, height, |x, y| {
        let value = luma[y as usize * w + x as usize];
        let (tx0, tx1, ax) = tiles.neighbours_x(x as usize);
        let (ty0, ty1, ay) = tiles.neighbours_y(y as usize);
        let at = |tx: usize, ty: usize| f32::from(curves[ty * tiles.nx + tx][value as usize]);

        let top = at(tx0, ty0) * (1.0 - ax) + at(tx1, ty0) * ax;
        let bottom = at(tx0, ty1) * (1.0 - ax) + at(tx1, ty1) * ax;
        let mapped = top * (1.0 - ay) + bottom * ay;

        let shift = (mapped - f32::from(value)) * BLEND;
        Rgb(image.get_pixel(x, y).0.map(|c| round_to_u8(f32::from(c) + shift)))
    })
}

/// BT.601 luma rounded to 8 bits.
fn luminance([r, g, b]: [u8; 3]) -> u8 {
    round_to_u8(0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b))
}

/// Clip `histogram`, redistribute the excess, and return the cumulative
/// mapping scaled to `0..=255`.
fn equalization_curve(mut histogram: [u32; 256], clip_limit: f32) -> [u8; 256] {
    let total: u32 = histogram.iter().sum();
    if total == 0 {
        return std::array::from_fn(|i| i as u8);
    }

    let limit = ((clip_limit * total as f32 / 256.0).round() as u32).max(1);
    let mut excess = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    // Even share to every bin, then the remainder spread at a fixed stride
    // so it does not pile up at the dark end.
    let share = excess / 256;
    let remainder = (excess % 256) as usize;
    for bin in histogram.iter_mut() {
        *bin += share;
    }
    if remainder > 0 {
        let stride = 256 / remainder;
        for i in 0..remainder {
            histogram[i * stride] += 1;
        }
    }

    let scale = 255.0 / total as f32;
    let mut cumulative = 0u32;
    std::array::from_fn(|i| {
        cumulative += histogram[i];
        round_to_u8(cumulative as f32 * scale)
    })
}

/// Tile geometry along both axes.
struct Tiles {
    nx: usize,
    ny: usize,
    tile_w: usize,
    tile_h: usize,
    width: usize,
    height: usize,
}

impl Tiles {
    fn new(nx: usize, ny: usize, width: usize, height: usize) -> Self {
        Self {
            nx,
            ny,
            tile_w: width / nx,
            tile_h: height / ny,
            width,
            height,
        }
    }

    fn span_x(&self, tx: usize) -> (usize, usize) {
        span(tx, self.nx, self.tile_w, self.width)
    }

    fn span_y(&self, ty: usize) -> (usize, usize) {
        span(ty, self.ny, self.tile_h, self.height)
    }

    fn neighbours_x(&self, x: usize) -> (usize, usize, f32) {
        neighbours(x, self.nx, self.tile_w)
    }

    fn neighbours_y(&self, y: usize) -> (usize, usize, f32) {
        neighbours(y, self.ny, self.tile_h)
    }
}

fn span(index: usize, count: usize, size: usize, len: usize) -> (usize, usize) {
    let start = index * size;
    let end = if index + 1 == count { len } else { start + size };
    (start, end)
}

/// The two tiles whose centres bracket `pos`, and the blend weight of the
/// second. Outside the outermost centres both tiles are the same.
fn neighbours(pos: usize, count: usize, size: usize) -> (usize, usize, f32) {
    let centre = ((pos as f32 + 0.5) / size as f32 - 0.5).clamp(0.0, (count - 1) as f32);
    let first = centre.floor() as usize;
    let second = (first + 1).min(count - 1);
    (first, second, centre - first as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(clip_limit: f32, grid_size: u32) -> ClaheConfig {
        ClaheConfig {
            enabled: true,
            clip_limit,
            grid_size,
        }
    }

    fn luma_range(image: &RgbImage) -> u8 {
        let values: Vec<u8> = image.pixels().map(|p| luminance(p.0)).collect();
        values.iter().max().unwrap() - values.iter().min().unwrap()
    }

    #[test]
    fn test_curve_without_clipping_is_plain_equalization() {
        let mut histogram = [0u32; 256];
        histogram[50] = 512;
        histogram[60] = 512;
        let curve = equalization_curve(histogram, 1000.0);
        assert_eq!(curve[50], 128);
        assert_eq!(curve[60], 255);
        assert_eq!(curve[49], 0);
    }

    #[test]
    fn test_clipping_conserves_pixel_count() {
        let mut histogram = [0u32; 256];
        histogram[128] = 1000;
        let curve = equalization_curve(histogram, 2.0);
        // Every pixel still lands somewhere: the curve ends at full scale.
        assert_eq!(curve[255], 255);
        // and the single spike no longer jumps straight to white
        assert!(curve[128] < 255);
    }

    #[test]
    fn test_global_equalization_of_two_tones() {
        let image = RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([50, 50, 50])
            } else {
                Rgb([60, 60, 60])
            }
        });
        let out = clahe(&image, &config(1000.0, 1));
        // 50 maps to 128 and 60 to 255; half of each shift is applied.
        assert_eq!(out.get_pixel(0, 0).0, [89, 89, 89]);
        assert_eq!(out.get_pixel(31, 31).0, [158, 158, 158]);
    }

    #[test]
    fn test_stretches_low_contrast_gradient() {
        let image = RgbImage::from_fn(64, 64, |x, _| {
            let v = 100 + (x / 4) as u8;
            Rgb([v, v, v])
        });
        let out = clahe(&image, &config(40.0, 2));
        assert_eq!(out.dimensions(), (64, 64));
        assert!(luma_range(&out) > luma_range(&image));
    }

    #[test]
    fn test_more_tiles_than_pixels() {
        let image = RgbImage::from_fn(3, 2, |x, y| Rgb([(x * 60) as u8, (y * 90) as u8, 10]));
        let out = clahe(&image, &config(2.0, 8));
        assert_eq!(out.dimensions(), (3, 2));
    }

    #[test]
    fn test_is_deterministic() {
        let image = RgbImage::from_fn(20, 13, |x, y| Rgb([(x * 11) as u8, (y * 17) as u8, 99]));
        let config = ClaheConfig::default();
        assert_eq!(clahe(&image, &config), clahe(&image, &config));
    }
}
