//! Two-channel 8-bit composites and raster drawing.
//!
//! Overlay products pair two channels of the same size: channel A holds
//! class-colored marks on black (stroke and dot levels come from
//! [`Motion::overlay_level`](crate::track::Motion::overlay_level), indices
//! into the classic 4-band palette), channel B holds the underlying image
//! normalized to 8-bit grayscale. Keeping the channels separate lets a
//! viewer blend or toggle them; nothing here depends on a display.

use ndarray::{Array2, Array3, ArrayBase, ArrayView2, Axis, DataMut, Ix2};

use crate::calibration::Calibration;
use crate::stack::FrameStack;

/// Two-channel composite over a single raster (a colored kymograph).
#[derive(Debug, Clone)]
pub struct Composite {
    /// Channel A: class-colored marks on black.
    pub overlay: Array2<u8>,
    /// Channel B: the source raster as 8-bit grayscale.
    pub base: Array2<u8>,
    /// Calibration of the raster both channels cover.
    pub calibration: Calibration,
}

/// Two-channel composite over a whole stack.
#[derive(Debug, Clone)]
pub struct StackComposite {
    /// Channel A per frame: class-colored marks on black.
    pub overlay: Array3<u8>,
    /// Channel B per frame: the source frames as 8-bit grayscale.
    pub base: Array3<u8>,
    /// Calibration of the source stack.
    pub calibration: Calibration,
}

impl StackComposite {
    /// Build a blank-overlay composite over a stack's frames.
    ///
    /// Channel B is the stack normalized to 8-bit with one min/max across
    /// all frames, so brightness stays comparable over time.
    #[must_use]
    pub fn from_stack(stack: &impl FrameStack) -> Self {
        let frames = stack.frame_count();
        let (h, w) = (stack.height(), stack.width());

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for t in 0..frames {
            for &v in stack.frame(t) {
                min = min.min(v);
                max = max.max(v);
            }
        }

        let mut base = Array3::zeros((frames, h, w));
        if max > min {
            let scale = 255.0 / (max - min);
            for t in 0..frames {
                let frame = stack.frame(t);
                let mut target = base.index_axis_mut(Axis(0), t);
                for ((r, c), &v) in frame.indexed_iter() {
                    target[[r, c]] = ((v - min) * scale).round() as u8;
                }
            }
        }

        Self {
            overlay: Array3::zeros((frames, h, w)),
            base,
            calibration: stack.calibration().clone(),
        }
    }

    /// Number of frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.overlay.len_of(Axis(0))
    }
}

/// Convert a raster to 8-bit grayscale by min/max normalization.
///
/// A flat raster (max equals min) maps to all zeros.
#[must_use]
pub fn to_gray(raster: &ArrayView2<'_, f32>) -> Array2<u8> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in raster {
        min = min.min(v);
        max = max.max(v);
    }
    if max <= min {
        return Array2::zeros(raster.dim());
    }
    let scale = 255.0 / (max - min);
    raster.map(|&v| ((v - min) * scale).round() as u8)
}

/// Stamp a filled disc of the given diameter; size 1 is a single pixel.
///
/// Marks falling outside the canvas are clipped silently.
pub fn draw_dot<S>(canvas: &mut ArrayBase<S, Ix2>, center: [i32; 2], level: u8, size: usize)
where
    S: DataMut<Elem = u8>,
{
    let [cx, cy] = center;
    if size <= 1 {
        set_pixel(canvas, cx, cy, level);
        return;
    }
    let r = (size / 2) as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                set_pixel(canvas, cx + dx, cy + dy, level);
            }
        }
    }
}

/// Draw a stroked line between two pixels (Bresenham walk, round brush).
pub fn draw_line<S>(canvas: &mut ArrayBase<S, Ix2>, from: [i32; 2], to: [i32; 2], level: u8, stroke: usize)
where
    S: DataMut<Elem = u8>,
{
    let [mut x0, mut y0] = from;
    let [x1, y1] = to;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        draw_dot(canvas, [x0, y0], level, stroke);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn set_pixel<S>(canvas: &mut ArrayBase<S, Ix2>, x: i32, y: i32, level: u8)
where
    S: DataMut<Elem = u8>,
{
    let (h, w) = canvas.dim();
    if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
        canvas[[y as usize, x as usize]] = level;
    }
}
