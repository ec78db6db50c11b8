use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File picked up from the working directory when present.
pub const CONFIG_FILE: &str = "flappy.json";

/// Rejected configuration values, reported before any run starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("screen must be non-empty, got {width}x{height}")]
    EmptyScreen { width: u32, height: u32 },
    #[error("ground line {ground_y} must lie inside the screen height {height}")]
    GroundOutsideScreen { ground_y: i32, height: u32 },
    #[error("gap height {gap} must be smaller than the screen height {height}")]
    GapTooTall { gap: i32, height: u32 },
    #[error("gap range [{min}, {max}] is empty or starts above the screen")]
    InvalidGapRange { min: i32, max: i32 },
    #[error("scroll speed must be positive")]
    ZeroSpeed,
    #[error("frame rate must be positive")]
    ZeroFps,
    #[error("population must contain at least one controller")]
    EmptyPopulation,
    #[error("elite count {elite} must be between 1 and the population {population}")]
    EliteOutOfRange { elite: usize, population: usize },
    #[error("hidden layer must have at least one neuron")]
    EmptyHiddenLayer,
}

/// World geometry, rules and pacing of one simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub width: u32,
    pub height: u32,
    /// Top of the ground strip; an agent whose sprite reaches below it is out.
    pub ground_y: i32,
    /// Interactive tick rate. Training ignores it and runs uncapped.
    pub fps: u32,
    pub agent_x: i32,
    pub agent_y: f32,
    pub spawn_x: i32,
    /// Vertical opening between the two barriers of an obstacle.
    pub gap: i32,
    pub gap_min: i32,
    pub gap_max: i32,
    /// Horizontal speed shared by obstacles and the ground.
    pub scroll_speed: i32,
    pub fitness_threshold: f32,
    /// Scores below this force alternating extreme gaps in population mode.
    pub difficulty_window: u32,
    pub easy_gaps: [i32; 2],
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 570,
            height: 800,
            ground_y: 730,
            fps: 60,
            agent_x: 230,
            agent_y: 350.0,
            spawn_x: 700,
            gap: 200,
            gap_min: 50,
            gap_max: 450,
            scroll_speed: 5,
            fitness_threshold: 50_000.0,
            difficulty_window: 10,
            easy_gaps: [50, 500],
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyScreen {
                width: self.width,
                height: self.height,
            });
        }
        if self.ground_y <= 0 || self.ground_y > self.height as i32 {
            return Err(ConfigError::GroundOutsideScreen {
                ground_y: self.ground_y,
                height: self.height,
            });
        }
        if self.gap <= 0 || self.gap >= self.height as i32 {
            return Err(ConfigError::GapTooTall {
                gap: self.gap,
                height: self.height,
            });
        }
        if self.gap_min > self.gap_max || self.gap_min >= self.height as i32 {
            return Err(ConfigError::InvalidGapRange {
                min: self.gap_min,
                max: self.gap_max,
            });
        }
        if self.scroll_speed <= 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        Ok(())
    }

    /// Half the screen height; the shaping reward peaks there.
    pub fn center_y(&self) -> f32 {
        self.height as f32 / 2.0
    }
}

/// Knobs of the evolutionary trainer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub population: usize,
    pub max_generations: usize,
    pub elite: usize,
    pub hidden: usize,
    pub mutation_rate: f32,
    pub mutation_scale: f32,
    /// Upper bound on ticks per generation, in case a population never fails.
    pub max_ticks: Option<u64>,
    /// Seeds used to re-evaluate the winner once training stops.
    pub validation_runs: u64,
    pub model_path: String,
    pub stats_path: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            population: 50,
            max_generations: 10_000,
            elite: 5,
            hidden: 6,
            mutation_rate: 0.2,
            mutation_scale: 0.5,
            max_ticks: Some(200_000),
            validation_runs: 8,
            model_path: "model".to_string(),
            stats_path: "stats.json".to_string(),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.elite == 0 || self.elite > self.population {
            return Err(ConfigError::EliteOutOfRange {
                elite: self.elite,
                population: self.population,
            });
        }
        if self.hidden == 0 {
            return Err(ConfigError::EmptyHiddenLayer);
        }
        Ok(())
    }
}

/// Everything read from [`CONFIG_FILE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub sim: SimConfig,
    pub train: TrainConfig,
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sim.validate()?;
        self.train.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn gap_as_tall_as_screen_is_rejected() {
        let config = SimConfig {
            gap: 800,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GapTooTall { gap: 800, height: 800 })
        );
    }

    #[test]
    fn inverted_gap_range_is_rejected() {
        let config = SimConfig {
            gap_min: 300,
            gap_max: 100,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGapRange { .. })
        ));
    }

    #[test]
    fn elite_larger_than_population_is_rejected() {
        let train = TrainConfig {
            population: 3,
            elite: 4,
            ..TrainConfig::default()
        };
        assert_eq!(
            train.validate(),
            Err(ConfigError::EliteOutOfRange { elite: 4, population: 3 })
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "sim": { "seed": 7 }, "train": { "population": 12 } }"#)
                .expect("parse");
        assert_eq!(settings.sim.seed, Some(7));
        assert_eq!(settings.sim.gap, 200);
        assert_eq!(settings.train.population, 12);
        assert_eq!(settings.train.elite, 5);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = Settings::load_or_default("definitely/not/here.json").expect("defaults");
        assert_eq!(settings, Settings::default());
    }
}
