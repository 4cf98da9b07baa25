use anyhow::{Context, Result};
use aviary_lib::app::{fly_formation, Trainer};
use aviary_lib::model::config::AppConfig;
use aviary_lib::model::geometry::Vec2;
use aviary_lib::model::history::HistoryLogger;
use aviary_lib::model::metrics::init_logging;
use aviary_lib::model::persistence;
use aviary_lib::model::physics::ArenaWorld;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path, used when it exists
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve controllers headless
    Train {
        /// Number of generations to run
        #[arg(short, long, default_value_t = 10)]
        generations: u32,

        /// Population size (overrides the config)
        #[arg(short, long)]
        population: Option<usize>,

        /// RNG seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Directory for the JSON-lines generation log
        #[arg(long)]
        history: Option<String>,

        /// Start from a saved controller instead of random ones
        #[arg(long)]
        load: Option<PathBuf>,

        /// Where to write the best controller (`.gz` compresses)
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Fly a saved controller to a set of points and report arrivals
    Fly {
        /// Saved controller file
        controller: PathBuf,

        /// Target points as `x,y` in arena units
        #[arg(short, long = "point", value_parser = parse_point, required = true)]
        points: Vec<Vec2>,

        /// Tick limit
        #[arg(short, long, default_value_t = 2000)]
        ticks: u64,

        /// Directory for the JSON-lines event log
        #[arg(long)]
        history: Option<String>,
    },
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok(Vec2::new(x, y))
}

fn load_config(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        let content = std::fs::read_to_string(path)?;
        AppConfig::from_toml(&content).with_context(|| format!("invalid config {path}"))
    } else {
        Ok(AppConfig::default())
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let mut config = load_config(&args.config)?;

    match args.command {
        Command::Train {
            generations,
            population,
            seed,
            history,
            load,
            save,
        } => {
            if let Some(population) = population {
                config.evolution.population_size = population;
            }
            if seed.is_some() {
                config.evolution.seed = seed;
            }
            if history.is_some() {
                config.trainer.history_dir = history;
            }

            let mut trainer = Trainer::new(&config)?;
            if let Some(path) = load {
                trainer.load_and_reseed(path)?;
            }
            trainer.run_generations(generations)?;

            for record in &trainer.engine.generations {
                println!("{}", serde_json::to_string(&record.summary())?);
            }
            println!("Highscore: {:.3}", trainer.engine.highscore);

            if let Some(path) = save {
                trainer.save_best(&path)?;
                println!("Best controller saved to {}", path.display());
            }
            trainer.shutdown();
        }
        Command::Fly {
            controller,
            points,
            ticks,
            history,
        } => {
            let controller = persistence::load_controller(&controller)
                .with_context(|| format!("loading {}", controller.display()))?;
            let mut logger = match history {
                Some(dir) => HistoryLogger::new_at(&dir)?,
                None => HistoryLogger::new_dummy(),
            };
            let mut world = ArenaWorld::new(&config.arena);
            let report = fly_formation(
                &mut world,
                controller,
                &config.drone,
                &points,
                ticks,
                &mut logger,
            )?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10, 20.5").unwrap(), Vec2::new(10.0, 20.5));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,1").is_err());
    }

    #[test]
    fn test_missing_config_falls_back_to_default() {
        let config = load_config("/nonexistent/aviary.toml").unwrap();
        assert_eq!(
            config.evolution.population_size,
            AppConfig::default().evolution.population_size
        );
    }
}
