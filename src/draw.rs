//! Software renderer into an RGBA frame buffer.

use crate::base::BASE_HEIGHT;
use crate::bird::Bird;
use crate::mask::{Mask, PIPE_LIP_HEIGHT, pipe_bottom_mask, pipe_top_mask};
use crate::pipe::Pipe;
use crate::sim::Simulation;

/// Ticks each wing pose is held for.
pub const ANIMATION_TIME: u64 = 5;
const WING_CYCLE: [usize; 4] = [0, 1, 2, 1];

type Rgba = (u8, u8, u8, u8);

const SKY: Rgba = (78, 192, 202, 255);
const PIPE_BODY: Rgba = (96, 186, 58, 255);
const PIPE_LIP: Rgba = (64, 140, 40, 255);
const GROUND: Rgba = (222, 216, 149, 255);
const GRASS: Rgba = (114, 190, 70, 255);
const BIRD_BODY: [Rgba; 3] = [(250, 210, 40, 255), (245, 196, 30, 255), (240, 180, 20, 255)];
const WING: Rgba = (255, 244, 200, 255);
const EYE: Rgba = (20, 20, 20, 255);
const BEAK: Rgba = (240, 110, 40, 255);
const TEXT: Rgba = (255, 255, 255, 255);

/// Wing pose for the given tick; a nose-diving bird keeps its wings level.
pub fn wing_frame(tick: u64, tilt: f32) -> usize {
    if tilt <= -80.0 {
        return 1;
    }
    WING_CYCLE[((tick / ANIMATION_TIME) % WING_CYCLE.len() as u64) as usize]
}

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, col: Rgba) {
        for px in self.frame.chunks_exact_mut(4) {
            px.copy_from_slice(&[col.0, col.1, col.2, col.3]);
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, col: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        if idx + 3 >= self.frame.len() {
            return;
        }
        let a = col.3 as u16;
        let ia = 255 - a;
        for (c, src) in [col.0, col.1, col.2].into_iter().enumerate() {
            let dst = self.frame[idx + c] as u16;
            self.frame[idx + c] = ((src as u16 * a + dst * ia) / 255) as u8;
        }
        self.frame[idx + 3] = 255;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, col: Rgba) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, col);
            }
        }
    }

    /// Paints every set pixel of `mask` with its top-left corner at `(x, y)`.
    pub fn blit_mask(&mut self, mask: &Mask, x: i32, y: i32, mut color: impl FnMut(u32, u32) -> Rgba) {
        let my0 = (-y).max(0) as u32;
        let my1 = (self.height as i32 - y).clamp(0, mask.height() as i32) as u32;
        for my in my0..my1 {
            for mx in 0..mask.width() {
                if mask.get(mx, my) {
                    self.blend_pixel(x + mx as i32, y + my as i32, color(mx, my));
                }
            }
        }
    }

    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, col: Rgba) {
        let mut cx = x;
        for ch in text.chars() {
            if let Some(rows) = glyph_5x7(ch) {
                for (ry, row) in rows.iter().enumerate() {
                    for rx in 0..5 {
                        if (row >> (4 - rx)) & 1 == 1 {
                            self.fill_rect(cx + rx * scale, y + ry as i32 * scale, scale, scale, col);
                        }
                    }
                }
            }
            cx += 6 * scale;
        }
    }

    pub fn text_width(text: &str, scale: i32) -> i32 {
        text.chars().count() as i32 * 6 * scale
    }
}

fn draw_pipe(canvas: &mut Canvas, pipe: &Pipe) {
    let lip = PIPE_LIP_HEIGHT;
    let top = pipe_top_mask();
    let top_lip_start = top.height() - lip;
    canvas.blit_mask(top, pipe.x, pipe.top(), |_, y| {
        if y >= top_lip_start { PIPE_LIP } else { PIPE_BODY }
    });
    canvas.blit_mask(pipe_bottom_mask(), pipe.x, pipe.bottom(), |_, y| {
        if y < lip { PIPE_LIP } else { PIPE_BODY }
    });
}

fn draw_ground(canvas: &mut Canvas, sim: &Simulation) {
    let base = sim.base();
    for x in [base.x1, base.x2] {
        canvas.fill_rect(x, base.y, base.width(), BASE_HEIGHT, GROUND);
        let mut stripe = x;
        while stripe < x + base.width() {
            canvas.fill_rect(stripe, base.y, 12, 12, GRASS);
            stripe += 24;
        }
    }
}

fn draw_bird(canvas: &mut Canvas, bird: &Bird, tick: u64) {
    let mask = crate::mask::bird_mask();
    let frame = wing_frame(tick, bird.tilt);
    let slope = -bird.tilt.clamp(-60.0, 60.0).to_radians().tan();
    let cx = mask.width() as f32 / 2.0;
    let x = bird.x();
    let y = bird.y.round() as i32;
    let lift = |mx: u32| ((mx as f32 - cx) * slope).round() as i32;

    for my in 0..mask.height() {
        for mx in 0..mask.width() {
            if mask.get(mx, my) {
                canvas.blend_pixel(x + mx as i32, y + my as i32 + lift(mx), BIRD_BODY[frame]);
            }
        }
    }
    let wing_y = y + 14 + frame as i32 * 6;
    for wx in 10..30 {
        canvas.fill_rect(x + wx, wing_y + lift(wx as u32), 1, 8, WING);
    }
    canvas.fill_rect(x + 46, y + 10 + lift(46), 6, 6, EYE);
    for bx in 56..68 {
        canvas.fill_rect(x + bx, y + 22 + lift(bx as u32), 1, 8, BEAK);
    }
}

/// Draws one frame of `sim`. `status` lines go top-left, `banner` centered.
pub fn render(frame: &mut [u8], sim: &Simulation, status: &[String], banner: Option<&str>) {
    let config = sim.config();
    let mut canvas = Canvas::new(frame, config.width, config.height);
    canvas.clear(SKY);

    for pipe in sim.pipes() {
        draw_pipe(&mut canvas, pipe);
    }

    let score = format!("SCORE: {}", sim.score());
    let score_x = config.width as i32 - 10 - Canvas::text_width(&score, 4);
    canvas.draw_text(&score, score_x, 10, 4, TEXT);

    draw_ground(&mut canvas, sim);

    for bird in sim.birds() {
        draw_bird(&mut canvas, bird, sim.tick_count());
    }

    for (i, line) in status.iter().enumerate() {
        canvas.draw_text(line, 10, 10 + i as i32 * 20, 2, TEXT);
    }

    if let Some(text) = banner {
        let x = (config.width as i32 - Canvas::text_width(text, 3)) / 2;
        let y = config.height as i32 / 2 - 60;
        canvas.fill_rect(0, y - 12, config.width as i32, 45, (0, 0, 0, 140));
        canvas.draw_text(text, x, y, 3, TEXT);
    }
}

fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    Some(match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x1E, 0x11, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x1E, 0x10, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x1E, 0x10, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0E],
        'H' => [0x11, 0x11, 0x1F, 0x11, 0x11, 0x11, 0x11],
        'I' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x1F],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x12, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1E, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x1E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ':' => [0x00, 0x04, 0x00, 0x00, 0x04, 0x00, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn wings_cycle_and_lock_when_diving() {
        let frames: Vec<usize> = (0..20).step_by(5).map(|t| wing_frame(t, 0.0)).collect();
        assert_eq!(frames, vec![0, 1, 2, 1]);
        assert_eq!(wing_frame(0, -85.0), 1);
    }

    #[test]
    fn blend_ignores_offscreen_pixels() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.blend_pixel(-1, 0, TEXT);
        canvas.blend_pixel(4, 4, TEXT);
        canvas.fill_rect(-10, -10, 11, 11, TEXT);
        assert_eq!(&frame[..4], &[255, 255, 255, 255]);
        assert!(frame[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn render_fills_the_whole_frame() {
        let config = SimConfig {
            seed: Some(1),
            ..SimConfig::default()
        };
        let sim = Simulation::new(config.clone(), 2);
        let mut frame = vec![0u8; (config.width * config.height * 4) as usize];
        render(&mut frame, &sim, &["GEN 1".to_string()], Some("GAME OVER"));
        assert!(frame.chunks_exact(4).all(|px| px[3] == 255));
        let bird = &sim.birds()[0];
        let center = ((bird.y as u32 + 24) * config.width + bird.x() as u32 + 34) as usize * 4;
        assert_ne!(&frame[center..center + 3], &[SKY.0, SKY.1, SKY.2]);
    }
}
