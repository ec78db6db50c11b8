//! Generational search over brains, scored by the evaluation loop.

use crate::brain::Brain;
use crate::config::{ConfigError, SimConfig, TrainConfig};
use crate::sim::{Outcome, RunReport, Simulation};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub score: u32,
    pub ticks: u64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub struct TrainingResult {
    pub winner: Brain,
    pub fitness: f32,
    pub generations: usize,
    /// A generation crossed the fitness threshold.
    pub solved: bool,
}

pub struct Trainer {
    sim: SimConfig,
    train: TrainConfig,
    rng: SmallRng,
    pop: Vec<Brain>,
    generation: usize,
    history: Vec<GenerationStats>,
    best: Option<(Brain, f32)>,
}

impl Trainer {
    pub fn new(sim: SimConfig, train: TrainConfig) -> Result<Self, ConfigError> {
        sim.validate()?;
        train.validate()?;
        let mut rng = match sim.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let pop = (0..train.population)
            .map(|_| Brain::random(train.hidden, &mut rng))
            .collect::<Vec<Brain>>();
        info!(
            population = pop.len(),
            parameters = pop[0].parameter_count(),
            "trainer ready"
        );
        Ok(Self {
            sim,
            train,
            rng,
            pop,
            generation: 0,
            history: Vec::new(),
            best: None,
        })
    }

    pub fn population(&self) -> &[Brain] {
        &self.pop
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Best brain seen across all generations so far.
    pub fn best(&self) -> Option<(&Brain, f32)> {
        self.best.as_ref().map(|(brain, fitness)| (brain, *fitness))
    }

    fn generation_config(&self) -> SimConfig {
        SimConfig {
            seed: self.sim.seed.map(|s| s.wrapping_add(self.generation as u64)),
            ..self.sim.clone()
        }
    }

    /// Scores the current population in one shared run, then breeds the next one.
    pub fn run_generation(&mut self) -> RunReport {
        let mut sim = Simulation::new(self.generation_config(), self.pop.len());
        let report = sim.run(self.pop.as_mut_slice(), self.train.max_ticks);

        let mean = report.fitness.iter().sum::<f32>() / report.fitness.len() as f32;
        let (best_idx, best_fitness) = report.best().unwrap_or((0, f32::NEG_INFINITY));
        info!(
            generation = self.generation,
            best = best_fitness,
            mean,
            score = report.score,
            ticks = report.ticks,
            outcome = ?report.outcome,
            "generation evaluated"
        );
        self.history.push(GenerationStats {
            generation: self.generation,
            best_fitness,
            mean_fitness: mean,
            score: report.score,
            ticks: report.ticks,
            outcome: report.outcome,
        });
        let improved = self.best.as_ref().is_none_or(|(_, f)| best_fitness > *f);
        if improved && best_idx < self.pop.len() {
            self.best = Some((self.pop[best_idx].clone(), best_fitness));
        }

        self.reproduce(&report.fitness);
        report
    }

    /// Keeps the elite unchanged and fills the rest with mutated elite copies.
    fn reproduce(&mut self, fitness: &[f32]) {
        let mut idxs: Vec<usize> = (0..self.pop.len()).collect();
        idxs.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
        let elite: Vec<Brain> = idxs
            .iter()
            .take(self.train.elite)
            .map(|&i| self.pop[i].clone())
            .collect();

        let mut next = elite.clone();
        while next.len() < self.train.population {
            let mut child = elite[self.rng.gen_range(0..elite.len())].clone();
            child.mutate(&mut self.rng, self.train.mutation_rate, self.train.mutation_scale);
            next.push(child);
        }
        self.pop = next;
        self.generation += 1;
    }

    /// Runs generations until one reaches the threshold or the limit is hit.
    pub fn train(&mut self) -> TrainingResult {
        let mut solved = false;
        while self.generation < self.train.max_generations {
            let report = self.run_generation();
            if matches!(report.outcome, Outcome::ThresholdReached { .. }) {
                solved = true;
                break;
            }
        }
        let (winner, fitness) = match self.best.clone() {
            Some(best) => best,
            None => (self.pop[0].clone(), f32::NEG_INFINITY),
        };
        info!(generations = self.generation, fitness, solved, "training stopped");
        TrainingResult {
            winner,
            fitness,
            generations: self.generation,
            solved,
        }
    }
}

/// Plays `brain` alone once per seed, in parallel.
pub fn evaluate_batch(
    brain: &Brain,
    config: &SimConfig,
    seeds: &[u64],
    max_ticks: Option<u64>,
) -> Vec<RunReport> {
    seeds
        .par_iter()
        .map(|&seed| {
            let config = SimConfig {
                seed: Some(seed),
                ..config.clone()
            };
            let mut brain = brain.clone();
            let mut sim = Simulation::new(config, 1);
            sim.run(std::slice::from_mut(&mut brain), max_ticks)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> (SimConfig, TrainConfig) {
        let sim = SimConfig {
            seed: Some(17),
            ..SimConfig::default()
        };
        let train = TrainConfig {
            population: 6,
            elite: 2,
            hidden: 4,
            max_generations: 3,
            max_ticks: Some(400),
            ..TrainConfig::default()
        };
        (sim, train)
    }

    #[test]
    fn reproduce_keeps_size_and_elite() {
        let (sim, train) = small();
        let mut trainer = Trainer::new(sim, train).expect("valid config");
        let fitness = [1.0, 9.0, 3.0, 7.0, 0.0, 2.0];
        let best = trainer.population()[1].clone();
        let second = trainer.population()[3].clone();
        trainer.reproduce(&fitness);
        assert_eq!(trainer.population().len(), 6);
        assert_eq!(trainer.population()[0], best);
        assert_eq!(trainer.population()[1], second);
        assert_eq!(trainer.generation(), 1);
    }

    #[test]
    fn zero_elite_is_refused() {
        let (sim, train) = small();
        let train = TrainConfig { elite: 0, ..train };
        assert_eq!(
            Trainer::new(sim, train).err(),
            Some(ConfigError::EliteOutOfRange {
                elite: 0,
                population: 6
            })
        );
    }

    #[test]
    fn generations_are_recorded() {
        let (sim, train) = small();
        let mut trainer = Trainer::new(sim, train).expect("valid config");
        let result = trainer.train();
        assert!(result.generations <= 3);
        assert_eq!(trainer.history().len(), result.generations);
        let best_seen = trainer
            .history()
            .iter()
            .map(|s| s.best_fitness)
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(result.fitness, best_seen);
        assert_eq!(trainer.population().len(), 6);
    }

    #[test]
    fn seeded_training_is_reproducible() {
        let (sim, train) = small();
        let mut a = Trainer::new(sim.clone(), train.clone()).expect("valid config");
        let mut b = Trainer::new(sim, train).expect("valid config");
        a.train();
        b.train();
        assert_eq!(a.history(), b.history());
    }

    #[test]
    fn batch_matches_sequential_runs() {
        let (config, _) = small();
        let brain = Brain::random(4, &mut SmallRng::seed_from_u64(2));
        let seeds = [1, 2, 3];
        let reports = evaluate_batch(&brain, &config, &seeds, Some(300));
        assert_eq!(reports.len(), 3);
        for (report, &seed) in reports.iter().zip(&seeds) {
            let mut solo = brain.clone();
            let mut sim = Simulation::new(
                SimConfig {
                    seed: Some(seed),
                    ..config.clone()
                },
                1,
            );
            let expected = sim.run(std::slice::from_mut(&mut solo), Some(300));
            assert_eq!(report, &expected);
            assert_eq!(report.fitness.len(), 1);
        }
    }
}
