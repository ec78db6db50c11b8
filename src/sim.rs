//! Fixed-timestep evaluation loop for one or many birds.
//!
//! Each bird is paired with a controller slot for its whole life. The live
//! birds and their slots sit in two parallel vectors that are only compacted
//! once per tick, after every removal of that tick has been marked, so an index
//! always refers to the same bird within a tick. Fitness is kept in a ledger
//! indexed by slot and outlives the bird it belongs to.

use crate::base::Base;
use crate::bird::Bird;
use crate::config::SimConfig;
use crate::controller::{Controller, Observation};
use crate::pipe::Pipe;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const SHAPING_SCALE: f32 = 0.1;
pub const COLLISION_PENALTY: f32 = 1.0;
pub const PASS_BONUS: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    Collision,
    OutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub slot: usize,
    pub cause: RemovalCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// A controller's fitness went past the configured threshold.
    ThresholdReached { slot: usize, fitness: f32 },
    /// No bird is left; `last` is how the final one went down.
    Extinct { last: Option<RemovalCause> },
    TickBudget,
    /// Stopped from outside, e.g. the window was closed.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub score: u32,
    /// An obstacle was passed during this tick.
    pub passed: bool,
    pub removals: Vec<Removal>,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: Outcome,
    pub ticks: u64,
    pub score: u32,
    /// Final fitness per controller slot.
    pub fitness: Vec<f32>,
}

impl RunReport {
    pub fn best(&self) -> Option<(usize, f32)> {
        best_of(&self.fitness)
    }
}

fn best_of(fitness: &[f32]) -> Option<(usize, f32)> {
    fitness
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn retain_unmarked<T>(items: &mut Vec<T>, doomed: &[bool]) {
    let mut idx = 0;
    items.retain(|_| {
        let keep = !doomed[idx];
        idx += 1;
        keep
    });
}

pub struct Simulation {
    config: SimConfig,
    rng: SmallRng,
    birds: Vec<Bird>,
    /// Controller slot of each live bird, aligned with `birds`.
    slots: Vec<usize>,
    fitness: Vec<f32>,
    pipes: Vec<Pipe>,
    base: Base,
    score: u32,
    tick: u64,
    last_removal: Option<RemovalCause>,
    outcome: Option<Outcome>,
}

impl Simulation {
    /// One bird per controller, all starting at the same spot.
    pub fn new(config: SimConfig, controllers: usize) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let first = Pipe::spawn(&config, &mut rng);
        let birds = (0..controllers)
            .map(|_| Bird::new(config.agent_x, config.agent_y))
            .collect();
        Self {
            base: Base::new(config.ground_y),
            birds,
            slots: (0..controllers).collect(),
            fitness: vec![0.0; controllers],
            pipes: vec![first],
            score: 0,
            tick: 0,
            last_removal: None,
            outcome: None,
            rng,
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn live_slots(&self) -> &[usize] {
        &self.slots
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn fitness(&self) -> &[f32] {
        &self.fitness
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// More than one controller: threshold and early-difficulty rules apply.
    pub fn population_mode(&self) -> bool {
        self.fitness.len() > 1
    }

    /// Ends the run at the current tick boundary.
    pub fn cancel(&mut self) {
        if self.outcome.is_none() {
            self.finish(Outcome::Cancelled);
        }
    }

    /// First obstacle whose right edge has not yet gone past the birds.
    pub fn next_pipe(&self) -> Option<&Pipe> {
        let x = self.config.agent_x;
        self.pipes
            .iter()
            .find(|p| p.right_edge() >= x)
            .or_else(|| self.pipes.last())
    }

    fn finish(&mut self, outcome: Outcome) {
        info!(
            tick = self.tick,
            score = self.score,
            ?outcome,
            "run finished"
        );
        self.outcome = Some(outcome);
    }

    fn report(&self, passed: bool, removals: Vec<Removal>) -> TickReport {
        TickReport {
            tick: self.tick,
            score: self.score,
            passed,
            removals,
            outcome: self.outcome,
        }
    }

    /// Advances the world one tick. `controllers[slot]` drives the bird of that slot.
    ///
    /// # Panics
    ///
    /// Panics if fewer controllers are given than the simulation was created with.
    pub fn tick<C: Controller>(&mut self, controllers: &mut [C]) -> TickReport {
        assert!(
            controllers.len() >= self.fitness.len(),
            "{} controllers for {} slots",
            controllers.len(),
            self.fitness.len()
        );
        if self.outcome.is_some() {
            return self.report(false, Vec::new());
        }

        // Termination.
        if self.population_mode() {
            if let Some((slot, fitness)) = best_of(&self.fitness) {
                if fitness > self.config.fitness_threshold {
                    self.finish(Outcome::ThresholdReached { slot, fitness });
                    return self.report(false, Vec::new());
                }
            }
        }
        if self.birds.is_empty() {
            self.finish(Outcome::Extinct {
                last: self.last_removal,
            });
            return self.report(false, Vec::new());
        }

        // Physics, shaping reward and controller queries.
        let target = self.next_pipe().copied();
        let center = self.config.center_y();
        for (bird, &slot) in self.birds.iter_mut().zip(&self.slots) {
            bird.integrate();
            self.fitness[slot] += (center - (center - bird.y).abs()) * SHAPING_SCALE;
            if let Some(pipe) = &target {
                let observation = Observation {
                    bird_y: bird.y,
                    pipe_x: pipe.x as f32,
                    gap_top: pipe.gap_center() as f32,
                    gap_bottom: pipe.bottom() as f32,
                };
                if controllers[slot].wants_impulse(&observation) {
                    bird.impulse();
                }
            }
        }

        // Collisions and passes.
        let mut doomed = vec![false; self.birds.len()];
        let mut removals = Vec::new();
        let mut passed = false;
        for pipe in &mut self.pipes {
            for (i, bird) in self.birds.iter().enumerate() {
                if doomed[i] {
                    continue;
                }
                let slot = self.slots[i];
                if pipe.collide(bird) {
                    self.fitness[slot] -= COLLISION_PENALTY;
                    doomed[i] = true;
                    removals.push(Removal {
                        slot,
                        cause: RemovalCause::Collision,
                    });
                    continue;
                }
                if !pipe.passed && pipe.x < bird.x() {
                    pipe.passed = true;
                    passed = true;
                }
            }
            pipe.advance(self.config.scroll_speed);
        }

        // Scoring and spawning.
        if passed {
            self.score += 1;
            for (i, &slot) in self.slots.iter().enumerate() {
                if !doomed[i] {
                    self.fitness[slot] += PASS_BONUS;
                }
            }
            let mut pipe = Pipe::spawn(&self.config, &mut self.rng);
            if self.population_mode() && self.score < self.config.difficulty_window {
                let easy = self.config.easy_gaps[(self.score % 2) as usize];
                pipe.set_gap_center(easy);
            }
            debug!(
                tick = self.tick,
                score = self.score,
                gap = pipe.gap_center(),
                "obstacle passed"
            );
            self.pipes.push(pipe);
        }

        // Cull.
        self.pipes.retain(|p| !p.off_screen());
        for (i, bird) in self.birds.iter().enumerate() {
            if !doomed[i] && bird.out_of_bounds(self.config.ground_y) {
                doomed[i] = true;
                removals.push(Removal {
                    slot: self.slots[i],
                    cause: RemovalCause::OutOfBounds,
                });
            }
        }
        if !removals.is_empty() {
            retain_unmarked(&mut self.birds, &doomed);
            retain_unmarked(&mut self.slots, &doomed);
            for removal in &removals {
                debug!(tick = self.tick, slot = removal.slot, cause = ?removal.cause, "bird removed");
            }
            self.last_removal = removals.last().map(|r| r.cause);
        }
        debug_assert_eq!(self.birds.len(), self.slots.len());

        self.base.advance(self.config.scroll_speed);
        self.tick += 1;
        self.report(passed, removals)
    }

    /// Ticks uncapped until the run ends or `max_ticks` have elapsed.
    pub fn run<C: Controller>(&mut self, controllers: &mut [C], max_ticks: Option<u64>) -> RunReport {
        while self.outcome.is_none() {
            if let Some(max) = max_ticks {
                if self.tick >= max {
                    self.finish(Outcome::TickBudget);
                    break;
                }
            }
            self.tick(controllers);
        }
        RunReport {
            outcome: self.outcome.unwrap_or(Outcome::Cancelled),
            ticks: self.tick,
            score: self.score,
            fitness: self.fitness.clone(),
        }
    }
}
