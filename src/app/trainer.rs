use anyhow::{Context, Result};
use std::path::Path;

use crate::model::config::AppConfig;
use crate::model::controller::Controller;
use crate::model::evolution::{EvolutionEngine, TickOutcome};
use crate::model::history::HistoryLogger;
use crate::model::persistence;
use crate::model::physics::{ArenaWorld, PhysicsWorld};

/// Frame loop around the evolution engine.
///
/// Each [`frame`](Trainer::frame) runs `speed` ticks unless paused. Completed
/// generations are appended to the history log.
pub struct Trainer<W: PhysicsWorld = ArenaWorld> {
    pub world: W,
    pub engine: EvolutionEngine,
    pub paused: bool,
    pub speed: u32,
    pub frame_count: u64,
    history: HistoryLogger,
}

impl Trainer<ArenaWorld> {
    /// Builds a rapier arena and, when `trainer.history_dir` is set, a history log.
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let history = match &config.trainer.history_dir {
            Some(dir) => HistoryLogger::new_at(dir)
                .with_context(|| format!("opening history log in {dir}"))?,
            None => HistoryLogger::new_dummy(),
        };
        Self::with_world(ArenaWorld::new(&config.arena), config, history)
    }
}

impl<W: PhysicsWorld> Trainer<W> {
    pub fn with_world(mut world: W, config: &AppConfig, history: HistoryLogger) -> Result<Self> {
        let engine = EvolutionEngine::new(&mut world, config)?;
        Ok(Self {
            world,
            engine,
            paused: false,
            speed: config.trainer.speed.max(1),
            frame_count: 0,
            history,
        })
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        tracing::info!(paused = self.paused, "Training pause toggled");
    }

    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed.max(1);
    }

    /// Runs one frame. Returns the ids of generations completed during it.
    pub fn frame(&mut self) -> Result<Vec<u32>> {
        let mut completed = Vec::new();
        if self.paused {
            return Ok(completed);
        }
        for _ in 0..self.speed {
            if let Some(id) = self.tick()? {
                completed.push(id);
            }
        }
        self.frame_count += 1;
        Ok(completed)
    }

    /// Ticks until `count` more generations have completed, ignoring pause.
    pub fn run_generations(&mut self, count: u32) -> Result<()> {
        let mut done = 0;
        while done < count {
            if self.tick()?.is_some() {
                done += 1;
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<Option<u32>> {
        match self.engine.tick(&mut self.world)? {
            TickOutcome::Rollover(id) => {
                if let Some(record) = self.engine.generations.last() {
                    self.history
                        .generation_completed(record.summary(), self.engine.highscore)?;
                }
                Ok(Some(id))
            }
            TickOutcome::Stepped { .. } => Ok(None),
        }
    }

    /// Population size for the next generation.
    pub fn resize(&mut self, population: usize) -> Result<()> {
        self.engine.set_population_size(population)?;
        Ok(())
    }

    /// Best controller of the last finished generation, or the one in slot 0
    /// before any generation has finished.
    #[must_use]
    pub fn best_controller(&self) -> Option<&Controller> {
        self.engine
            .generations
            .last()
            .map(|record| &record.best_agent.controller)
            .or_else(|| self.engine.best_agent().map(|drone| &drone.controller))
    }

    pub fn save_best<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let controller = self
            .best_controller()
            .context("no controller to save")?;
        persistence::save_controller(controller, path)?;
        Ok(())
    }

    pub fn reseed(&mut self, controller: Controller) -> Result<()> {
        self.engine.reseed(&mut self.world, controller)?;
        self.history
            .reseeded(self.engine.target_population_size())?;
        Ok(())
    }

    /// Restarts training from a saved controller.
    pub fn load_and_reseed<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let controller = persistence::load_controller(path)
            .with_context(|| format!("loading controller from {}", path.display()))?;
        self.reseed(controller)
    }

    /// Tears the population down, leaving only the arena walls in the world.
    pub fn shutdown(mut self) -> W {
        self.engine.dispose(&mut self.world);
        self.world
    }
}
