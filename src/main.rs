use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flappy_evolve::config::{CONFIG_FILE, Settings};
use flappy_evolve::evolve::{Trainer, evaluate_batch};
use flappy_evolve::{app, storage};
use std::fs;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "flappy-evolve", about = "Flappy bird with evolved controllers")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Evolve a controller and save the winner.
    Train,
    /// Watch the saved controller play.
    RunAi,
    /// Play with Space, Up or the mouse.
    PlayHuman,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn train(settings: Settings) -> Result<()> {
    let Settings { sim, train } = settings;
    let mut trainer = Trainer::new(sim.clone(), train.clone())?;
    let result = trainer.train();
    if !result.solved {
        warn!(
            generations = result.generations,
            fitness = result.fitness,
            "fitness threshold not reached, saving best so far"
        );
    }

    storage::save(&train.model_path, &result.winner)?;
    info!(path = %train.model_path, fitness = result.fitness, "model saved");

    let stats = serde_json::to_string_pretty(trainer.history()).context("encoding stats")?;
    fs::write(&train.stats_path, stats)
        .with_context(|| format!("writing {}", train.stats_path))?;

    if train.validation_runs > 0 {
        let seeds: Vec<u64> = (0..train.validation_runs).collect();
        let reports = evaluate_batch(&result.winner, &sim, &seeds, train.max_ticks);
        let mean = reports.iter().map(|r| r.score as f32).sum::<f32>() / reports.len() as f32;
        let best = reports.iter().map(|r| r.score).max().unwrap_or(0);
        info!(runs = reports.len(), mean_score = mean, best_score = best, "validation done");
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load_or_default(CONFIG_FILE)?;

    match cli.mode {
        Mode::Train => train(settings),
        Mode::RunAi => {
            let brain = storage::load(&settings.train.model_path)?;
            info!(hidden = brain.hidden(), "model loaded");
            app::run_ai(settings.sim, brain)
        }
        Mode::PlayHuman => app::play_human(settings.sim),
    }
}
