use crate::mask::{BIRD_HEIGHT, BIRD_WIDTH};

pub const IMPULSE_VELOCITY: f32 = -10.5;
pub const GRAVITY: f32 = 1.5;
pub const MAX_FALL: f32 = 16.0;
/// Extra upward push while the arc is still rising.
pub const RISE_BIAS: f32 = 2.0;
pub const MAX_TILT: f32 = 25.0;
pub const TILT_RATE: f32 = 20.0;
pub const MIN_TILT: f32 = -90.0;
/// Tilt stays up until the bird drops this far below its impulse height.
const TILT_HOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    x: i32,
    pub y: f32,
    pub vel: f32,
    pub tilt: f32,
    /// Ticks since the last impulse.
    pub ticks: u32,
    /// Height the current arc started from.
    pub origin: f32,
}

impl Bird {
    pub fn new(x: i32, y: f32) -> Self {
        Self {
            x,
            y,
            vel: 0.0,
            tilt: 0.0,
            ticks: 0,
            origin: y,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn width(&self) -> u32 {
        BIRD_WIDTH
    }

    pub fn height(&self) -> u32 {
        BIRD_HEIGHT
    }

    pub fn impulse(&mut self) {
        self.vel = IMPULSE_VELOCITY;
        self.ticks = 0;
        self.origin = self.y;
    }

    /// Displacement for the current tick count, before it is applied.
    pub fn displacement(vel: f32, ticks: u32) -> f32 {
        let t = ticks as f32;
        let mut disp = vel + GRAVITY * t * t;
        if disp > MAX_FALL {
            disp = MAX_FALL;
        }
        if disp < 0.0 {
            disp -= RISE_BIAS;
        }
        disp
    }

    /// Advances one tick and returns the applied displacement.
    pub fn integrate(&mut self) -> f32 {
        self.ticks += 1;
        let disp = Self::displacement(self.vel, self.ticks);
        self.y += disp;

        if disp < 0.0 || self.y < self.origin + TILT_HOLD {
            if self.tilt < MAX_TILT {
                self.tilt = MAX_TILT;
            }
        } else if self.tilt > MIN_TILT {
            self.tilt = (self.tilt - TILT_RATE).max(MIN_TILT);
        }
        disp
    }

    /// True once the sprite reaches below `ground_y` or above the screen.
    pub fn out_of_bounds(&self, ground_y: i32) -> bool {
        self.y + self.height() as f32 > ground_y as f32 || self.y < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_is_quadratic_in_elapsed_ticks() {
        let mut bird = Bird::new(230, 350.0);
        bird.impulse();
        let expected = [-11.0, -6.5, 3.0, 13.5, 16.0, 16.0];
        let mut y = 350.0;
        for want in expected {
            let disp = bird.integrate();
            assert!((disp - want).abs() < 1e-5, "got {disp}, want {want}");
            y += want;
            assert!((bird.y - y).abs() < 1e-4);
        }
    }

    #[test]
    fn fall_never_exceeds_cap() {
        let mut bird = Bird::new(230, 0.0);
        for _ in 0..200 {
            assert!(bird.integrate() <= MAX_FALL);
        }
    }

    #[test]
    fn bias_only_while_rising() {
        assert_eq!(Bird::displacement(-10.5, 0), -12.5);
        assert_eq!(Bird::displacement(0.0, 2), 6.0);
        assert_eq!(Bird::displacement(-6.0, 2), 0.0);
    }

    #[test]
    fn impulse_restarts_the_arc() {
        let mut bird = Bird::new(230, 350.0);
        for _ in 0..4 {
            bird.integrate();
        }
        bird.impulse();
        assert_eq!(bird.ticks, 0);
        assert_eq!(bird.vel, IMPULSE_VELOCITY);
        assert_eq!(bird.origin, bird.y);
        bird.impulse();
        assert_eq!(bird.ticks, 0);
    }

    #[test]
    fn tilt_snaps_up_then_decays_to_floor() {
        let mut bird = Bird::new(230, 350.0);
        bird.impulse();
        bird.integrate();
        assert_eq!(bird.tilt, MAX_TILT);
        for _ in 0..40 {
            bird.integrate();
            assert!(bird.tilt >= MIN_TILT);
        }
        assert_eq!(bird.tilt, MIN_TILT);
    }

    #[test]
    fn x_is_fixed() {
        let mut bird = Bird::new(230, 350.0);
        for _ in 0..10 {
            bird.impulse();
            bird.integrate();
        }
        assert_eq!(bird.x(), 230);
    }

    #[test]
    fn bounds_use_sprite_bottom() {
        assert!(!Bird::new(230, 682.0).out_of_bounds(730));
        assert!(Bird::new(230, 682.5).out_of_bounds(730));
        assert!(Bird::new(230, -0.1).out_of_bounds(730));
    }
}
