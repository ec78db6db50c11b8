//! Per-pixel occupancy shapes used for exact collision tests.
//!
//! Sprites are generated procedurally: the bird is an ellipse filling its
//! frame, a pipe is a narrower shaft capped by a full-width lip. Two masks
//! collide only when a set pixel of one lands on a set pixel of the other, so
//! touching bounding boxes with empty corners do not count.

use std::sync::OnceLock;

pub const BIRD_WIDTH: u32 = 68;
pub const BIRD_HEIGHT: u32 = 48;
pub const PIPE_WIDTH: u32 = 104;
pub const PIPE_HEIGHT: u32 = 640;
pub const PIPE_LIP_HEIGHT: u32 = 48;
/// Columns trimmed from each side of the shaft below the lip.
pub const PIPE_SHAFT_INSET: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut solid: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if solid(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) as usize;
            self.bits[idx] = value;
        }
    }

    #[cfg(test)]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Upside-down copy, used for the upper barrier.
    pub fn flipped_vertical(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            self.get(x, self.height - 1 - y)
        })
    }

    /// First overlapping pixel, in this mask's coordinates, when `other` is
    /// placed at `offset` relative to this mask's top-left corner.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> Option<(u32, u32)> {
        let (dx, dy) = offset;
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (self.width as i32).min(dx + other.width as i32);
        let y1 = (self.height as i32).min(dy + other.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32) && other.get((x - dx) as u32, (y - dy) as u32) {
                    return Some((x as u32, y as u32));
                }
            }
        }
        None
    }
}

fn ellipse(width: u32, height: u32) -> Mask {
    let rx = width as f32 / 2.0;
    let ry = height as f32 / 2.0;
    Mask::from_fn(width, height, |x, y| {
        let nx = (x as f32 + 0.5 - rx) / rx;
        let ny = (y as f32 + 0.5 - ry) / ry;
        nx * nx + ny * ny <= 1.0
    })
}

fn pipe() -> Mask {
    Mask::from_fn(PIPE_WIDTH, PIPE_HEIGHT, |x, y| {
        y < PIPE_LIP_HEIGHT || (PIPE_SHAFT_INSET..PIPE_WIDTH - PIPE_SHAFT_INSET).contains(&x)
    })
}

pub fn bird_mask() -> &'static Mask {
    static MASK: OnceLock<Mask> = OnceLock::new();
    MASK.get_or_init(|| ellipse(BIRD_WIDTH, BIRD_HEIGHT))
}

/// Lower barrier: lip on top, shaft hanging down.
pub fn pipe_bottom_mask() -> &'static Mask {
    static MASK: OnceLock<Mask> = OnceLock::new();
    MASK.get_or_init(pipe)
}

/// Upper barrier: lip at the bottom edge, facing the gap.
pub fn pipe_top_mask() -> &'static Mask {
    static MASK: OnceLock<Mask> = OnceLock::new();
    MASK.get_or_init(|| pipe().flipped_vertical())
}
