//! Windowed front-end: one simulation tick per frame-clock period.

use crate::brain::Brain;
use crate::config::SimConfig;
use crate::controller::{Controller, HumanController};
use crate::draw::render;
use crate::sim::{Outcome, Simulation};
use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use std::time::{Duration, Instant};
use tracing::{error, info};
use winit::dpi::LogicalSize;
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

/// Gates ticks to a fixed rate.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    period: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self::starting_at(fps, Instant::now())
    }

    pub fn starting_at(fps: u32, start: Instant) -> Self {
        Self {
            period: Duration::from_secs(1) / fps.max(1),
            last: start,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// True at most once per period; a late frame does not queue extra ticks.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }
}

fn banner_for(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Extinct { .. } => "GAME OVER - R TO RESTART",
        Outcome::ThresholdReached { .. } => "TARGET REACHED",
        Outcome::TickBudget => "TIME UP",
        Outcome::Cancelled => "STOPPED",
    }
}

/// Opens a window and plays until the user closes it.
///
/// `on_input` runs once per input frame before the tick, so it can feed key
/// state to the controllers.
fn run_window<C, F>(config: SimConfig, mut controllers: Vec<C>, title: &str, mut on_input: F) -> Result<()>
where
    C: Controller + 'static,
    F: FnMut(&WinitInputHelper, &mut [C]) + 'static,
{
    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    let window = WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(false)
        .build(&event_loop)?;

    let mut pixels = {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(config.width, config.height, surface_texture)?
    };

    let population = controllers.len();
    let mut sim = Simulation::new(config.clone(), population);
    let mut clock = FrameClock::new(config.fps);
    info!(population, fps = config.fps, "window opened");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            let status = [
                format!("ALIVE: {}/{}", sim.birds().len(), population),
                format!("TICK: {}", sim.tick_count()),
            ];
            render(pixels.frame_mut(), &sim, &status, sim.outcome().map(banner_for));
            if let Err(err) = pixels.render() {
                error!(%err, "frame presentation failed");
                *control_flow = ControlFlow::Exit;
                return;
            }
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape) || input.close_requested() || input.destroyed() {
                sim.cancel();
                *control_flow = ControlFlow::Exit;
                return;
            }

            if input.key_pressed(VirtualKeyCode::R) && sim.is_over() {
                sim = Simulation::new(config.clone(), population);
                info!("restarted");
            }

            on_input(&input, &mut controllers);

            if !sim.is_over() && clock.ready() {
                sim.tick(&mut controllers);
            }

            window.request_redraw();
        }
    });
}

pub fn play_human(config: SimConfig) -> Result<()> {
    run_window(config, vec![HumanController::default()], "Flappy Bird", |input, humans| {
        let flap = input.key_pressed(VirtualKeyCode::Space)
            || input.key_pressed(VirtualKeyCode::Up)
            || input.mouse_pressed(0);
        if flap {
            for human in humans.iter_mut() {
                human.press();
            }
        }
    })
}

pub fn run_ai(config: SimConfig, brain: Brain) -> Result<()> {
    run_window(config, vec![brain], "Flappy Bird - AI", |_, _| {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_fires_once_per_period() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(60, start);
        let period = clock.period();
        assert!(!clock.ready_at(start + period / 2));
        assert!(clock.ready_at(start + period));
        assert!(!clock.ready_at(start + period + period / 2));
        // A long stall yields a single tick, not a burst.
        assert!(clock.ready_at(start + period * 10));
        assert!(!clock.ready_at(start + period * 10));
    }

    #[test]
    fn every_outcome_has_a_banner() {
        assert!(banner_for(Outcome::Extinct { last: None }).contains("GAME OVER"));
        assert_eq!(banner_for(Outcome::Cancelled), "STOPPED");
    }
}
