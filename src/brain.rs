//! Small feed-forward network used as an evolvable controller.

use crate::controller::{Controller, Observation};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const INPUTS: usize = 4;
/// Observations are divided by this before entering the network.
const INPUT_SCALE: f32 = 800.0;
const WEIGHT_RANGE: f32 = 1.0;

/// 4 inputs, one tanh hidden layer, one tanh output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    hidden: usize,
    /// Row-major `hidden x INPUTS`.
    w_in: Vec<f32>,
    b_in: Vec<f32>,
    w_out: Vec<f32>,
    b_out: f32,
}

impl Brain {
    pub fn random<R: Rng + ?Sized>(hidden: usize, rng: &mut R) -> Self {
        let mut weight = || rng.gen_range(-WEIGHT_RANGE..WEIGHT_RANGE);
        let w_in = (0..hidden * INPUTS).map(|_| weight()).collect();
        let b_in = (0..hidden).map(|_| weight()).collect();
        let w_out = (0..hidden).map(|_| weight()).collect();
        let b_out = weight();
        Self {
            hidden,
            w_in,
            b_in,
            w_out,
            b_out,
        }
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn parameter_count(&self) -> usize {
        self.w_in.len() + self.b_in.len() + self.w_out.len() + 1
    }

    /// Weight vectors match the hidden layer size. Decoded brains may not.
    pub fn is_well_formed(&self) -> bool {
        self.hidden > 0
            && self.w_in.len() == self.hidden * INPUTS
            && self.b_in.len() == self.hidden
            && self.w_out.len() == self.hidden
    }

    pub fn forward(&self, inputs: [f32; INPUTS]) -> f32 {
        let mut sum = self.b_out;
        for h in 0..self.hidden {
            let row = &self.w_in[h * INPUTS..(h + 1) * INPUTS];
            let pre: f32 = row.iter().zip(&inputs).map(|(w, x)| w * x).sum::<f32>() + self.b_in[h];
            sum += self.w_out[h] * pre.tanh();
        }
        sum.tanh()
    }

    /// Perturbs each parameter with probability `rate` by up to `scale`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f32, scale: f32) {
        let params = self
            .w_in
            .iter_mut()
            .chain(self.b_in.iter_mut())
            .chain(self.w_out.iter_mut())
            .chain(std::iter::once(&mut self.b_out));
        for p in params {
            if rng.r#gen::<f32>() < rate {
                *p += rng.gen_range(-scale..=scale);
            }
        }
    }
}

impl Controller for Brain {
    fn activate(&mut self, observation: &Observation) -> f32 {
        self.forward(observation.as_array().map(|v| v / INPUT_SCALE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn same_seed_same_brain() {
        let a = Brain::random(6, &mut SmallRng::seed_from_u64(3));
        let b = Brain::random(6, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert_eq!(a.parameter_count(), 6 * 4 + 6 + 6 + 1);
        assert!(a.is_well_formed());
    }

    #[test]
    fn mismatched_layers_are_not_well_formed() {
        let mut brain = Brain::random(3, &mut SmallRng::seed_from_u64(5));
        brain.w_out.pop();
        assert!(!brain.is_well_formed());
        let mut brain = Brain::random(3, &mut SmallRng::seed_from_u64(5));
        brain.hidden = 6;
        assert!(!brain.is_well_formed());
    }

    #[test]
    fn output_is_bounded() {
        let mut rng = SmallRng::seed_from_u64(9);
        let brain = Brain::random(8, &mut rng);
        for _ in 0..100 {
            let inputs = [0; INPUTS].map(|_: i32| rng.gen_range(-1000.0_f32..1000.0));
            let out = brain.forward(inputs);
            assert!((-1.0..=1.0).contains(&out));
        }
    }

    #[test]
    fn zero_rate_mutation_is_identity() {
        let mut rng = SmallRng::seed_from_u64(4);
        let brain = Brain::random(4, &mut rng);
        let mut copy = brain.clone();
        copy.mutate(&mut rng, 0.0, 1.0);
        assert_eq!(copy, brain);
        copy.mutate(&mut rng, 1.0, 1.0);
        assert_ne!(copy, brain);
    }

    #[test]
    fn acts_as_controller() {
        let mut brain = Brain::random(3, &mut SmallRng::seed_from_u64(1));
        let obs = Observation {
            bird_y: 350.0,
            pipe_x: 700.0,
            gap_top: 300.0,
            gap_bottom: 500.0,
        };
        let expected = brain.forward([350.0 / 800.0, 700.0 / 800.0, 300.0 / 800.0, 500.0 / 800.0]);
        assert_eq!(brain.activate(&obs), expected);
    }
}
