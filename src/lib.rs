//! Side-scrolling flappy bird with a deterministic evaluation loop for
//! one or many controllers, plus a neuroevolution trainer and a windowed
//! front-end.

pub mod app;
pub mod base;
pub mod bird;
pub mod brain;
pub mod config;
pub mod controller;
pub mod draw;
pub mod evolve;
pub mod mask;
pub mod pipe;
pub mod sim;
pub mod storage;

pub use config::{Settings, SimConfig, TrainConfig};
pub use controller::{Controller, Observation};
pub use sim::{Outcome, RunReport, Simulation};
