/// Width of one ground tile.
pub const BASE_WIDTH: i32 = 672;
pub const BASE_HEIGHT: i32 = 224;

/// Ground strip drawn as two copies of one tile that leapfrog each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Base {
    pub y: i32,
    pub x1: i32,
    pub x2: i32,
    width: i32,
}

impl Base {
    pub fn new(y: i32) -> Self {
        Self::with_width(y, BASE_WIDTH)
    }

    pub fn with_width(y: i32, width: i32) -> Self {
        Self {
            y,
            x1: 0,
            x2: width,
            width,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn advance(&mut self, speed: i32) {
        self.x1 -= speed;
        self.x2 -= speed;

        if self.x1 + self.width < 0 {
            self.x1 = self.x2 + self.width;
        }
        if self.x2 + self.width < 0 {
            self.x2 = self.x1 + self.width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_stay_one_tile_apart() {
        let mut base = Base::new(730);
        for _ in 0..2_000 {
            base.advance(5);
            assert_eq!((base.x1 - base.x2).abs(), BASE_WIDTH);
            let left = base.x1.min(base.x2);
            assert!(left <= 0 && left + 2 * BASE_WIDTH >= 570);
        }
    }

    #[test]
    fn recycles_behind_the_other_copy() {
        let mut base = Base::with_width(730, 10);
        base.advance(11);
        assert_eq!(base.x2, -1);
        assert_eq!(base.x1, 9);
    }
}
