use crate::bird::Bird;
use crate::config::SimConfig;
use crate::mask::{PIPE_HEIGHT, PIPE_WIDTH, bird_mask, pipe_bottom_mask, pipe_top_mask};
use rand::Rng;

/// A top/bottom barrier pair with a fixed opening between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub x: i32,
    /// Sampled gap position: the upper barrier ends here.
    gap_center: i32,
    gap: i32,
    /// Screen y of the upper barrier sprite.
    top: i32,
    /// Screen y of the lower barrier sprite.
    bottom: i32,
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: i32, gap: i32, gap_center: i32) -> Self {
        let mut pipe = Self {
            x,
            gap_center: 0,
            gap,
            top: 0,
            bottom: 0,
            passed: false,
        };
        pipe.set_gap_center(gap_center);
        pipe
    }

    /// New pipe at the spawn column with a uniformly drawn gap.
    pub fn spawn<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Self {
        let center = rng.gen_range(config.gap_min..=config.gap_max);
        Self::new(config.spawn_x, config.gap, center)
    }

    pub fn set_gap_center(&mut self, gap_center: i32) {
        self.gap_center = gap_center;
        self.top = gap_center - PIPE_HEIGHT as i32;
        self.bottom = gap_center + self.gap;
    }

    pub fn gap_center(&self) -> i32 {
        self.gap_center
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> i32 {
        PIPE_WIDTH as i32
    }

    pub fn right_edge(&self) -> i32 {
        self.x + self.width()
    }

    pub fn advance(&mut self, speed: i32) {
        self.x -= speed;
    }

    pub fn off_screen(&self) -> bool {
        self.right_edge() < 0
    }

    /// Pixel-exact overlap of the bird against either barrier.
    pub fn collide(&self, bird: &Bird) -> bool {
        let bird_mask = bird_mask();
        let bird_y = bird.y.round() as i32;
        let dx = self.x - bird.x();
        let top_hit = bird_mask.overlap(pipe_top_mask(), (dx, self.top - bird_y));
        let bottom_hit = bird_mask.overlap(pipe_bottom_mask(), (dx, self.bottom - bird_y));
        top_hit.is_some() || bottom_hit.is_some()
    }
}
