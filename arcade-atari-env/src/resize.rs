//! Downscaling of grayscale frames.
use anyhow::{Context, Result};
use image::{imageops, imageops::FilterType, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

/// Resizes a grayscale image.
pub trait Resize {
    /// Resizes `src` (`src_shape` = `(width, height)`, row-major) into `dst` (`dst_shape`).
    fn resize(
        &mut self,
        src: &[u8],
        src_shape: (usize, usize),
        dst: &mut [u8],
        dst_shape: (usize, usize),
    ) -> Result<()>;
}

/// Resampling method.
///
/// `Area` averages the source pixels covered by each destination pixel,
/// weighted by overlap. The other variants use [`image::imageops::resize`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum ResizeFilter {
    Area,
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl Default for ResizeFilter {
    fn default() -> Self {
        Self::Area
    }
}

/// [`Resize`] with a [`ResizeFilter`].
///
/// Area weights are built on the first call and kept while the source and
/// destination geometry stay the same.
#[derive(Debug, Clone, Default)]
pub struct Resizer {
    filter: ResizeFilter,
    area: Option<AreaWeights>,
}

impl Resizer {
    /// Creates a resizer using `filter`.
    pub fn new(filter: ResizeFilter) -> Self {
        Self { filter, area: None }
    }

    /// The resampling method.
    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }
}

impl From<ResizeFilter> for Resizer {
    fn from(filter: ResizeFilter) -> Self {
        Self::new(filter)
    }
}

impl Resize for Resizer {
    fn resize(
        &mut self,
        src: &[u8],
        src_shape: (usize, usize),
        dst: &mut [u8],
        dst_shape: (usize, usize),
    ) -> Result<()> {
        let filter = match self.filter {
            ResizeFilter::Area => {
                let weights = match self.area.take() {
                    Some(w) if w.src_shape == src_shape && w.dst_shape == dst_shape => w,
                    _ => AreaWeights::new(src_shape, dst_shape),
                };
                weights.apply(src, dst);
                self.area = Some(weights);
                return Ok(());
            }
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        };
        let img = ImageBuffer::<Luma<u8>, _>::from_raw(
            src_shape.0 as u32,
            src_shape.1 as u32,
            src.to_vec(),
        )
        .context("source buffer smaller than its geometry")?;
        let img = imageops::resize(&img, dst_shape.0 as u32, dst_shape.1 as u32, filter);
        dst.copy_from_slice(img.as_raw());
        Ok(())
    }
}

/// Overlap weights of an area-averaging resize between two fixed geometries.
#[derive(Debug, Clone)]
struct AreaWeights {
    src_shape: (usize, usize),
    dst_shape: (usize, usize),

    // Per destination column/row: overlapped source pixels and overlap lengths
    wx: Vec<Vec<(usize, f64)>>,
    wy: Vec<Vec<(usize, f64)>>,

    // Source area covered by one destination pixel
    norm: f64,
}

impl AreaWeights {
    fn new(src_shape: (usize, usize), dst_shape: (usize, usize)) -> Self {
        let (src_w, src_h) = src_shape;
        let (dst_w, dst_h) = dst_shape;
        Self {
            src_shape,
            dst_shape,
            wx: axis_weights(src_w, dst_w),
            wy: axis_weights(src_h, dst_h),
            norm: (src_w as f64 / dst_w as f64) * (src_h as f64 / dst_h as f64),
        }
    }

    fn apply(&self, src: &[u8], dst: &mut [u8]) {
        let src_w = self.src_shape.0;
        let dst_w = self.dst_shape.0;
        for (dy, ys) in self.wy.iter().enumerate() {
            for (dx, xs) in self.wx.iter().enumerate() {
                let mut acc = 0.0;
                for &(sy, w_y) in ys {
                    let row = &src[sy * src_w..(sy + 1) * src_w];
                    for &(sx, w_x) in xs {
                        acc += w_y * w_x * row[sx] as f64;
                    }
                }
                dst[dy * dst_w + dx] = (acc / self.norm).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Source pixels overlapped by each destination pixel along one axis, with overlap lengths.
fn axis_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * scale;
            let end = start + scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let w = end.min(s as f64 + 1.0) - start.max(s as f64);
                    if w > 1e-9 {
                        Some((s, w))
                    } else {
                        None
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_integer_factor() -> Result<()> {
        // 4x4 -> 2x2 averages 2x2 blocks
        #[rustfmt::skip]
        let src = [
            0, 2, 10, 10,
            4, 6, 10, 10,
            100, 100, 255, 255,
            100, 100, 255, 253,
        ];
        let mut dst = [0u8; 4];
        Resizer::new(ResizeFilter::Area).resize(&src, (4, 4), &mut dst, (2, 2))?;
        assert_eq!(dst, [3, 10, 100, 255]);
        Ok(())
    }

    #[test]
    fn test_area_fractional_factor() -> Result<()> {
        // 3 -> 2: each output covers 1.5 input pixels
        let src = [0, 90, 180];
        let mut dst = [0u8; 2];
        Resizer::new(ResizeFilter::Area).resize(&src, (3, 1), &mut dst, (2, 1))?;
        assert_eq!(dst, [30, 150]);
        Ok(())
    }

    #[test]
    fn test_uniform_stays_uniform() -> Result<()> {
        let src = vec![77u8; 160 * 210];
        let mut dst = vec![0u8; 84 * 84];
        for filter in [ResizeFilter::Area, ResizeFilter::Triangle, ResizeFilter::Nearest] {
            Resizer::new(filter).resize(&src, (160, 210), &mut dst, (84, 84))?;
            assert!(dst.iter().all(|&p| p == 77), "{:?}", filter);
        }
        Ok(())
    }

    #[test]
    fn test_area_weights_follow_geometry() -> Result<()> {
        let mut resizer = Resizer::new(ResizeFilter::Area);
        let mut dst = [0u8; 2];
        resizer.resize(&[0, 2, 4, 6], (4, 1), &mut dst, (2, 1))?;
        assert_eq!(dst, [1, 5]);
        resizer.resize(&[10, 20, 30, 40], (4, 1), &mut dst, (2, 1))?;
        assert_eq!(dst, [15, 35]);

        // A new geometry rebuilds the weights
        resizer.resize(&[0, 90, 180], (3, 1), &mut dst, (2, 1))?;
        assert_eq!(dst, [30, 150]);
        let mut one = [0u8; 1];
        resizer.resize(&[0, 90, 180], (3, 1), &mut one, (1, 1))?;
        assert_eq!(one, [90]);
        Ok(())
    }
}
